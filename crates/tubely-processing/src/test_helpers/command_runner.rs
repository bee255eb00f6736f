use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Mutex;
use std::time::Duration;

use super::probe_json;
use crate::command::{CommandError, CommandOutput, CommandRunner};

/// Canned behaviour for one program.
#[derive(Debug, Clone)]
pub enum Script {
    /// Return this output
    Output(CommandOutput),
    /// Copy the `-i` input to the last argument (as a remux would), then return this output
    CopyInput(CommandOutput),
    /// Fail as if the time limit was exceeded
    TimeOut,
}

impl Script {
    pub fn stdout(stdout: &str) -> Self {
        Script::Output(CommandOutput {
            status: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    pub fn copy_input() -> Self {
        Script::CopyInput(CommandOutput {
            status: Some(0),
            ..Default::default()
        })
    }
}

/// Command runner that never spawns processes.
///
/// Programs without a script fail to spawn.
#[derive(Default)]
pub struct ScriptedCommandRunner {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Working ffprobe and ffmpeg, with ffprobe reporting `display_aspect_ratio`.
    pub fn media_tools(display_aspect_ratio: &str) -> Self {
        Self::new()
            .on("ffprobe", Script::stdout(&probe_json(display_aspect_ratio)))
            .on("ffmpeg", Script::copy_input())
    }

    pub fn on(self, program: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(program.to_string(), script);
        self
    }

    /// Every invocation so far, as (program, args).
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == program)
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.clone()));

        let script = self.scripts.lock().unwrap().get(program).cloned();
        match script {
            Some(Script::Output(output)) => Ok(output),
            Some(Script::CopyInput(output)) => {
                let input = args
                    .iter()
                    .position(|a| a == "-i")
                    .and_then(|i| args.get(i + 1))
                    .expect("remux invocation without -i");
                let target = args.last().expect("remux invocation without output");
                std::fs::copy(input, target)?;
                Ok(output)
            }
            Some(Script::TimeOut) => Err(CommandError::TimedOut {
                program: program.to_string(),
                timeout: Duration::from_secs(300),
            }),
            None => Err(CommandError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
            }),
        }
    }
}
