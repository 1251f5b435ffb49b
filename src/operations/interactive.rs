use std::io::{BufRead, Write};
use anyhow::Result;

use crate::models::{FileRecord, ScanStats};
use crate::operations::{DeletionController, DeletionSummary};
use crate::utils::{format_size, format_time};

/// 用户对当前文件的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 删除当前文件
    Yes,
    /// 跳过当前文件
    No,
    /// 结束交互删除
    Quit,
    /// 删除当前及剩余的所有文件
    All,
}

impl Decision {
    /// 解析用户输入（不区分大小写，忽略首尾空白）
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" => Some(Decision::Yes),
            "n" => Some(Decision::No),
            "q" => Some(Decision::Quit),
            "a" => Some(Decision::All),
            _ => None,
        }
    }
}

/// 交互删除的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// 正在展示第 i 个文件
    Presenting(usize),
    /// 终态，之后不再删除任何文件
    Done,
}

/// 一次交互删除会话
struct InteractiveSession<'c, 'r, R, W> {
    controller: &'c DeletionController<'c>,
    candidates: Vec<&'r FileRecord>,
    input: R,
    output: W,
    summary: DeletionSummary,
}

impl<'c, 'r, R: BufRead, W: Write> InteractiveSession<'c, 'r, R, W> {
    fn run(mut self, stats: &mut ScanStats) -> Result<DeletionSummary> {
        let mut state = SessionState::Presenting(0);
        while let SessionState::Presenting(index) = state {
            state = self.step(index, stats)?;
        }
        Ok(self.summary)
    }

    /// 处理 `Presenting(index)`，返回下一个状态
    fn step(&mut self, index: usize, stats: &mut ScanStats) -> Result<SessionState> {
        let Some(&record) = self.candidates.get(index) else {
            return Ok(SessionState::Done);
        };

        if self.controller.cancellation.is_cancelled() {
            stats.mark_interrupted();
            return Ok(SessionState::Done);
        }

        self.present(index, record)?;

        let verdict = self.controller.classifier.classify(record.path());
        if !verdict.safe {
            writeln!(self.output, "⚠️  不可安全删除: {}", verdict.reason)?;
            self.summary.unsafe_skipped += 1;
            return Ok(SessionState::Presenting(index + 1));
        }

        loop {
            write!(self.output, "删除该文件? (y/n/q/a): ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line)?;

            // 等待输入期间可能收到了中断，此时输入端也会以 EOF 结束
            if self.controller.cancellation.is_cancelled() {
                writeln!(self.output, "\n操作被中断，停止交互删除。")?;
                stats.mark_interrupted();
                return Ok(SessionState::Done);
            }

            if read == 0 {
                writeln!(self.output, "\n输入已结束，退出交互删除。")?;
                return Ok(SessionState::Done);
            }

            match Decision::parse(&line) {
                Some(Decision::Yes) => {
                    let outcome = self.controller.attempt_delete(record, stats);
                    self.summary.tally(&outcome);
                    return Ok(SessionState::Presenting(index + 1));
                }
                Some(Decision::No) => {
                    writeln!(self.output, "跳过该文件。")?;
                    self.summary.declined += 1;
                    return Ok(SessionState::Presenting(index + 1));
                }
                Some(Decision::Quit) => {
                    writeln!(self.output, "退出交互删除。")?;
                    return Ok(SessionState::Done);
                }
                Some(Decision::All) => {
                    writeln!(self.output, "删除剩余的所有文件...")?;
                    self.delete_remaining(index, stats);
                    return Ok(SessionState::Done);
                }
                None => {
                    writeln!(self.output, "请输入 'y'（是）、'n'（否）、'q'（退出）或 'a'（全部）。")?;
                }
            }
        }
    }

    fn present(&mut self, index: usize, record: &FileRecord) -> Result<()> {
        let modified = record
            .modified()
            .map(format_time)
            .unwrap_or_else(|| "未知时间".to_string());

        writeln!(
            self.output,
            "\n[{}/{}] 文件: {}",
            index + 1,
            self.candidates.len(),
            record.path().display()
        )?;
        writeln!(self.output, "大小: {}", format_size(record.size()))?;
        writeln!(self.output, "修改时间: {}", modified)?;
        Ok(())
    }

    fn delete_remaining(&mut self, from: usize, stats: &mut ScanStats) {
        for &record in &self.candidates[from..] {
            if self.controller.cancellation.is_cancelled() {
                stats.mark_interrupted();
                break;
            }
            let outcome = self.controller.attempt_delete(record, stats);
            self.summary.tally(&outcome);
        }
    }
}

impl DeletionController<'_> {
    /// 逐个展示可访问的文件并询问是否删除
    ///
    /// `y` 删除并继续，`n` 跳过，`q` 结束，`a` 删除当前及剩余的全部文件后结束。
    /// 输入结束时视为 `q`。
    pub fn run_interactive<R: BufRead, W: Write>(
        &self,
        records: &[FileRecord],
        stats: &mut ScanStats,
        input: R,
        mut output: W,
    ) -> Result<DeletionSummary> {
        let candidates: Vec<&FileRecord> = records.iter().filter(|r| r.is_accessible()).collect();
        if candidates.is_empty() {
            writeln!(output, "\n⚠️  没有可删除的文件。")?;
            return Ok(DeletionSummary::default());
        }

        writeln!(output, "\n🗑️  交互删除模式{}", if self.is_dry_run() { "（演练）" } else { "" })?;
        writeln!(output, "共发现 {} 个可删除的大文件。", candidates.len())?;

        let session = InteractiveSession {
            controller: self,
            candidates,
            input,
            output,
            summary: DeletionSummary::default(),
        };
        session.run(stats)
    }
}
