use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use super::source::GpuReading;

const QUERY: &str =
    "--query-gpu=index,name,utilization.gpu,memory.free,memory.used,memory.total,temperature.gpu,uuid";

/// Upper bound on a single `nvidia-smi` invocation. A wedged driver can make it hang.
const NVIDIA_SMI_TIMEOUT: Duration = Duration::from_secs(5);

/// Enumerate NVIDIA GPUs via `nvidia-smi`. Any failure means "no GPU".
pub fn enumerate() -> Vec<GpuReading> {
    let mut cmd = Command::new("nvidia-smi");
    cmd.args([QUERY, "--format=csv,noheader,nounits"]);

    match run_with_deadline(&mut cmd, NVIDIA_SMI_TIMEOUT) {
        Ok(CommandOutcome::Finished { status, stdout }) if status.success() => {
            parse_csv(&String::from_utf8_lossy(&stdout))
        }
        Ok(CommandOutcome::Finished { status, .. }) => {
            tracing::debug!(%status, "nvidia-smi query failed");
            Vec::new()
        }
        Ok(CommandOutcome::TimedOut) => {
            tracing::warn!(
                timeout_secs = NVIDIA_SMI_TIMEOUT.as_secs(),
                "nvidia-smi did not answer in time, skipping GPU"
            );
            Vec::new()
        }
        Err(err) => {
            tracing::debug!(error = %err, "nvidia-smi not available");
            Vec::new()
        }
    }
}

#[derive(Debug)]
enum CommandOutcome {
    Finished { status: ExitStatus, stdout: Vec<u8> },
    TimedOut,
}

/// Run `cmd`, killing it once `timeout` has elapsed.
///
/// Stdout is read after exit, so this is only suitable for small outputs.
fn run_with_deadline(cmd: &mut Command, timeout: Duration) -> io::Result<CommandOutcome> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let mut stdout = Vec::new();
            if let Some(mut pipe) = child.stdout.take() {
                pipe.read_to_end(&mut stdout)?;
            }
            return Ok(CommandOutcome::Finished { status, stdout });
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(CommandOutcome::TimedOut);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn parse_csv(stdout: &str) -> Vec<GpuReading> {
    stdout.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<GpuReading> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 8 {
        return None;
    }

    // Any numeric column may be "[N/A]", which stays None
    Some(GpuReading {
        id: parts[0].parse().ok()?,
        name: parts[1].to_string(),
        load: parts[2].parse::<f64>().ok().map(|p| p / 100.0),
        memory_free_mb: parts[3].parse().ok(),
        memory_used_mb: parts[4].parse().ok(),
        memory_total_mb: parts[5].parse().ok(),
        temperature_c: parts[6].parse().ok(),
        uuid: parts[7].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_gpu_line() {
        let gpus = parse_csv(
            "0, NVIDIA GeForce RTX 3080, 37, 8123, 2117, 10240, 61, GPU-2b5c1e9a-8f3d-4c55-9a0e-1f1b7d3c9e21\n",
        );
        assert_eq!(gpus.len(), 1);
        let gpu = &gpus[0];
        assert_eq!(gpu.id, 0);
        assert_eq!(gpu.name, "NVIDIA GeForce RTX 3080");
        assert!((gpu.load.unwrap() - 0.37).abs() < 1e-9);
        assert_eq!(gpu.memory_free_mb, Some(8123));
        assert_eq!(gpu.memory_used_mb, Some(2117));
        assert_eq!(gpu.memory_total_mb, Some(10240));
        assert_eq!(gpu.temperature_c, Some(61.0));
        assert_eq!(gpu.uuid, "GPU-2b5c1e9a-8f3d-4c55-9a0e-1f1b7d3c9e21");
    }

    #[test]
    fn missing_temperature_is_none() {
        let gpus = parse_csv("1, Tesla T4, 0, 15000, 0, 15360, [N/A], GPU-abc\n");
        assert_eq!(gpus[0].temperature_c, None);
        assert_eq!(gpus[0].load, Some(0.0));
    }

    #[test]
    fn not_reported_load_and_memory_are_none() {
        let gpus = parse_csv("0, Tesla, [N/A], [N/A], [N/A], [N/A], 40, GPU-x\n");
        assert_eq!(gpus.len(), 1);
        let gpu = &gpus[0];
        assert_eq!(gpu.load, None);
        assert_eq!(gpu.memory_free_mb, None);
        assert_eq!(gpu.memory_used_mb, None);
        assert_eq!(gpu.memory_total_mb, None);
        assert_eq!(gpu.temperature_c, Some(40.0));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("not,enough,columns").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn hung_command_is_killed_at_deadline() {
        let start = Instant::now();
        let mut cmd = Command::new("sleep");
        cmd.arg("10");
        let outcome = run_with_deadline(&mut cmd, Duration::from_millis(100)).unwrap();
        assert!(matches!(outcome, CommandOutcome::TimedOut));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn finished_command_returns_stdout() {
        let mut cmd = Command::new("echo");
        cmd.arg("0, GPU, 1, 2, 3, 5, 30, GPU-y");
        let outcome = run_with_deadline(&mut cmd, Duration::from_secs(5)).unwrap();
        let CommandOutcome::Finished { status, stdout } = outcome else {
            panic!("echo should finish");
        };
        assert!(status.success());
        assert_eq!(parse_csv(&String::from_utf8_lossy(&stdout)).len(), 1);
    }

    #[test]
    fn missing_binary_is_an_error() {
        let mut cmd = Command::new("hostscan-no-such-binary");
        assert!(run_with_deadline(&mut cmd, Duration::from_secs(1)).is_err());
    }
}
