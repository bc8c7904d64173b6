use std::cell::Cell;
use std::collections::BTreeMap;

use crate::engine::{Engine, EngineEvent, MediaInfo, check_file_name};
use crate::foundation::error::{ReelError, ReelResult};

/// Scripted engine with an in-memory file store.
///
/// `exec` checks that every `-i` input is staged and writes a synthetic output file: a
/// stream copy (`-c copy`) reproduces the first input byte-for-byte, any other command
/// writes the first input followed by a manifest of the command line. Every command
/// line is recorded for inspection.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    loaded: bool,
    load_count: usize,
    files: BTreeMap<String, Vec<u8>>,
    commands: Vec<Vec<String>>,
    progress_steps: Vec<f64>,
    fail_load: Option<String>,
    fail_exec: Option<String>,
    fail_write: Option<String>,
    list_budget: Cell<Option<usize>>,
    probe_info: Option<MediaInfo>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self {
            progress_steps: vec![0.25, 0.5, 1.0],
            ..Self::default()
        }
    }

    /// `load` fails with `message` until the failure is cleared.
    pub fn with_load_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_load = Some(message.into());
        self
    }

    /// `exec` fails with `message` after emitting its progress.
    pub fn with_exec_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_exec = Some(message.into());
        self
    }

    /// Writing a file called `name` fails.
    pub fn with_write_failure(mut self, name: impl Into<String>) -> Self {
        self.fail_write = Some(name.into());
        self
    }

    /// `list_files` succeeds `calls` more times, then fails.
    pub fn with_list_failure_after(self, calls: usize) -> Self {
        self.list_budget.set(Some(calls));
        self
    }

    pub fn with_progress_steps(mut self, steps: Vec<f64>) -> Self {
        self.progress_steps = steps;
        self
    }

    /// Media facts returned by `probe` for any staged file.
    pub fn with_probe(mut self, info: MediaInfo) -> Self {
        self.probe_info = Some(info);
        self
    }

    pub fn clear_failures(&mut self) {
        self.fail_load = None;
        self.fail_exec = None;
        self.fail_write = None;
        self.list_budget.set(None);
    }

    /// Command lines run so far, oldest first.
    pub fn commands(&self) -> &[Vec<String>] {
        &self.commands
    }

    pub fn load_count(&self) -> usize {
        self.load_count
    }

    fn ensure_loaded(&self) -> ReelResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(ReelError::engine("in-memory engine is not loaded"))
        }
    }
}

impl Engine for InMemoryEngine {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn load(&mut self) -> ReelResult<()> {
        if self.loaded {
            return Ok(());
        }
        if let Some(msg) = &self.fail_load {
            return Err(ReelError::engine(msg.clone()));
        }
        self.loaded = true;
        self.load_count += 1;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        self.ensure_loaded()?;
        check_file_name(name)?;
        if self.fail_write.as_deref() == Some(name) {
            return Err(ReelError::engine(format!("write '{name}': store full")));
        }
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        self.ensure_loaded()?;
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ReelError::engine(format!("read '{name}': no such file")))
    }

    fn delete_file(&mut self, name: &str) -> ReelResult<()> {
        self.ensure_loaded()?;
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ReelError::engine(format!("delete '{name}': no such file")))
    }

    fn list_files(&self) -> ReelResult<Vec<String>> {
        self.ensure_loaded()?;
        match self.list_budget.get() {
            Some(0) => return Err(ReelError::engine("list: store unavailable")),
            Some(n) => self.list_budget.set(Some(n - 1)),
            None => {}
        }
        Ok(self.files.keys().cloned().collect())
    }

    fn exec(&mut self, args: &[String], on_event: &mut dyn FnMut(EngineEvent)) -> ReelResult<()> {
        self.ensure_loaded()?;
        self.commands.push(args.to_vec());

        let inputs: Vec<&String> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| &w[1])
            .collect();
        for input in &inputs {
            if !self.files.contains_key(input.as_str()) {
                return Err(ReelError::engine(format!(
                    "{input}: No such file or directory"
                )));
            }
        }
        let output = args
            .last()
            .ok_or_else(|| ReelError::engine("empty command line"))?;
        check_file_name(output)?;

        on_event(EngineEvent::Log(format!("in-memory: {}", args.join(" "))));
        for &step in &self.progress_steps {
            on_event(EngineEvent::Progress(step));
        }
        if let Some(msg) = &self.fail_exec {
            return Err(ReelError::engine(msg.clone()));
        }

        let mut bytes = inputs
            .first()
            .and_then(|name| self.files.get(name.as_str()))
            .cloned()
            .unwrap_or_default();
        let stream_copy = args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy");
        if !stream_copy {
            bytes.extend_from_slice(format!("\n#{}", args.join(" ")).as_bytes());
        }
        self.files.insert(output.clone(), bytes);
        Ok(())
    }

    fn probe(&mut self, name: &str) -> ReelResult<Option<MediaInfo>> {
        self.ensure_loaded()?;
        if !self.files.contains_key(name) {
            return Err(ReelError::engine(format!("probe '{name}': no such file")));
        }
        Ok(self.probe_info.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/memory.rs"]
mod tests;
