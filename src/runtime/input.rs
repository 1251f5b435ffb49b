use std::io::{self, BufRead, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::runtime::CancellationSignal;

/// 等待输入时检查取消信号的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 可被取消信号打断的行输入
///
/// 后台线程逐行读取底层输入并通过通道转发；取消后立即表现为 EOF，
/// 交互删除不必等用户按回车才能停下。
pub struct CancellableInput {
    lines: Receiver<io::Result<String>>,
    cancellation: CancellationSignal,
    buffer: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl CancellableInput {
    /// 启动读取线程
    pub fn spawn<R>(mut reader: R, cancellation: CancellationSignal) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (sender, lines) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if sender.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = sender.send(Err(err));
                        break;
                    }
                }
            });

        // 线程起不来时发送端已被丢弃，读取方会看到 EOF
        if let Err(err) = spawned {
            tracing::warn!("无法启动输入线程: {}", err);
        }

        Self {
            lines,
            cancellation,
            buffer: Vec::new(),
            pos: 0,
            finished: false,
        }
    }

    /// 等待下一行，取消或输入结束时返回 false
    fn next_line(&mut self) -> io::Result<bool> {
        loop {
            if self.cancellation.is_cancelled() {
                return Ok(false);
            }

            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(line)) => {
                    self.buffer = line.into_bytes();
                    self.pos = 0;
                    return Ok(true);
                }
                Ok(Err(err)) => return Err(err),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(false),
            }
        }
    }
}

impl Read for CancellableInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for CancellableInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buffer.len() && !self.finished && !self.next_line()? {
            self.finished = true;
            self.buffer.clear();
            self.pos = 0;
        }
        Ok(&self.buffer[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buffer.len());
    }
}
