// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GPU command trace replayer
//!
//! Feeds a recorded GP0/GP1 trace through the dispatcher and prints a JSON
//! summary of the resulting state. Trace lines are:
//!
//! ```text
//! # comment
//! gp0 A0000000 00000000 00010002 7FFF7FFF
//! gp1 08000001
//! vsync
//! ```

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use pandora_gs::core::config::GpuConfig;
use pandora_gs::core::gpu::{BackendEvent, FrameInfo, Gpu, RecordingBackend};
use pandora_gs::core::save_state::SaveStateFile;
use serde::Serialize;
use thiserror::Error;

/// Replay a GPU command trace
#[derive(Parser)]
#[command(name = "gpu-replay")]
#[command(about = "Replay a GP0/GP1 command trace through the GPU core", long_about = None)]
struct Args {
    /// Path to the trace file
    trace_file: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write a snapshot of the final state to this file
    #[arg(short = 's', long)]
    snapshot: Option<PathBuf>,

    /// Run vsyncs without waiting for the frame period
    #[arg(long)]
    no_limit: bool,
}

#[derive(Error, Debug)]
enum TraceError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: invalid word '{word}'")]
    InvalidWord { line: usize, word: String },

    #[error("line {line}: gp1 takes exactly one word")]
    ControlArity { line: usize },
}

/// One trace step
#[derive(Debug, Clone, PartialEq, Eq)]
enum TraceCommand {
    Data(Vec<u32>),
    Control(u32),
    Vsync,
}

#[derive(Serialize)]
struct ReplayReport {
    commands: usize,
    status: String,
    frames: usize,
    primitives: usize,
    uploads: usize,
    last_frame: Option<FrameInfo>,
}

fn parse_word(line: usize, word: &str) -> Result<u32, TraceError> {
    let digits = word.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|_| TraceError::InvalidWord {
        line,
        word: word.to_string(),
    })
}

fn parse_trace(contents: &str) -> Result<Vec<TraceCommand>, TraceError> {
    let mut commands = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        let mut fields = text.split_whitespace();
        let Some(command) = fields.next() else {
            continue;
        };

        let words = fields
            .map(|word| parse_word(line, word))
            .collect::<Result<Vec<_>, _>>()?;

        match command.to_ascii_lowercase().as_str() {
            "gp0" => commands.push(TraceCommand::Data(words)),
            "gp1" => match words.as_slice() {
                [word] => commands.push(TraceCommand::Control(*word)),
                _ => return Err(TraceError::ControlArity { line }),
            },
            "vsync" => commands.push(TraceCommand::Vsync),
            other => {
                return Err(TraceError::UnknownCommand {
                    line,
                    command: other.to_string(),
                })
            }
        }
    }

    Ok(commands)
}

fn report(gpu: &mut Gpu<RecordingBackend>, commands: usize) -> ReplayReport {
    let status = gpu.read_status();
    let events = &gpu.backend().events;
    let last_frame = events.iter().rev().find_map(|e| match e {
        BackendEvent::Frame(frame) => Some(*frame),
        _ => None,
    });
    let uploads = events
        .iter()
        .filter(|e| matches!(e, BackendEvent::Upload(_)))
        .count();

    ReplayReport {
        commands,
        status: format!("0x{:08X}", status),
        frames: gpu.backend().frame_count(),
        primitives: gpu.backend().primitive_count(),
        uploads,
        last_frame,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("gpu-replay v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            GpuConfig::load(path)?
        }
        None => GpuConfig::default(),
    };
    if args.no_limit {
        config.pacing.frame_limit = false;
    }

    info!("Loading trace from: {}", args.trace_file.display());
    let contents = fs::read_to_string(&args.trace_file)?;
    let commands = match parse_trace(&contents) {
        Ok(commands) => commands,
        Err(e) => {
            error!("Failed to parse trace: {}", e);
            return Err(Box::new(e));
        }
    };

    let mut gpu = Gpu::new(config, RecordingBackend::new());
    gpu.init()?;

    for command in &commands {
        match command {
            TraceCommand::Data(words) => gpu.write_data_chunk(words)?,
            TraceCommand::Control(word) => gpu.write_control_command(*word),
            TraceCommand::Vsync => gpu.update_lace(),
        }
    }

    info!("Replayed {} trace commands", commands.len());

    if let Some(path) = &args.snapshot {
        SaveStateFile::capture(&gpu)?.save_to_file(path)?;
        info!("Snapshot written to: {}", path.display());
    }

    let summary = report(&mut gpu, commands.len());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    gpu.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let trace = "# setup\n\
                     gp1 08000001\n\
                     \n\
                     gp0 0xE6000001 E5000002 # offsets\n\
                     VSYNC\n";
        let commands = parse_trace(trace).unwrap();
        assert_eq!(
            commands,
            vec![
                TraceCommand::Control(0x0800_0001),
                TraceCommand::Data(vec![0xE600_0001, 0xE500_0002]),
                TraceCommand::Vsync,
            ]
        );
    }

    #[test]
    fn test_parse_trace_errors() {
        assert!(matches!(
            parse_trace("gp0 XYZ"),
            Err(TraceError::InvalidWord { line: 1, .. })
        ));
        assert!(matches!(
            parse_trace("vsync\ngp1 1 2"),
            Err(TraceError::ControlArity { line: 2 })
        ));
        assert!(matches!(
            parse_trace("gp2 0"),
            Err(TraceError::UnknownCommand { line: 1, .. })
        ));
    }
}
