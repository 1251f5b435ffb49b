use std::io::{self, BufRead, BufReader};
use anyhow::Result;
use clap::Parser;

use large_file_cleanup::cli::Cli;
use large_file_cleanup::config::Config;
use large_file_cleanup::operations::confirm;
use large_file_cleanup::runtime::{spawn_signal_listener, CancellableInput, CancellationSignal};
use large_file_cleanup::{logging, App};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_create_default()?
    };
    cli.apply_overrides(&mut config);

    let log_file = logging::init(&config.report.log_dir, cli.verbose);

    let cancellation = CancellationSignal::new();
    let app = match App::new(config, cli.run_options(), cancellation.clone()) {
        Ok(app) => app.with_log_file(log_file),
        Err(err) => {
            tracing::error!("参数校验失败: {}", err);
            return Err(err.into());
        }
    };
    app.log_banner();

    if app.needs_confirmation() && !cli.yes {
        let proceed = confirm(
            io::stdin().lock(),
            io::stdout(),
            "\n非交互模式将自动删除所有安全的大文件，确认继续?",
        )?;
        if !proceed {
            println!("已取消清理。");
            return Ok(());
        }
    }

    let _listener = spawn_signal_listener(cancellation.clone());

    // 只有交互模式读取标准输入
    let source: Box<dyn BufRead + Send> = if cli.non_interactive {
        Box::new(io::empty())
    } else {
        Box::new(BufReader::new(io::stdin()))
    };
    let input = CancellableInput::spawn(source, cancellation);

    // 扫描和删除都是同步的文件系统操作，放到阻塞线程池中执行
    tokio::task::spawn_blocking(move || app.run(input, io::stdout())).await??;

    Ok(())
}
