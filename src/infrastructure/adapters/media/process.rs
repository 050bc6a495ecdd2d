//! 外部进程执行 - ffmpeg / ffprobe
//!
//! 子进程输出全部走管道，超时后随 Child 一起被杀掉。

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// 进程执行错误
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 运行外部程序，返回 stdout
///
/// `stdin` 非空时写入子进程标准输入后关闭。
pub async fn run_capture(
    program: &str,
    args: &[String],
    stdin: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<Vec<u8>, ProcessError> {
    tracing::debug!(program = %program, args = ?args, "Spawning process");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // 单独任务写 stdin，避免与 stdout 读取互相阻塞
    let writer = match (stdin, child.stdin.take()) {
        (Some(data), Some(mut pipe)) => Some(tokio::spawn(async move {
            let result = pipe.write_all(&data).await;
            drop(pipe);
            result
        })),
        _ => None,
    };

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            return Err(ProcessError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        return Err(ProcessError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            // 进程成功退出但未读完输入，按失败处理
            Ok(Err(e)) => return Err(ProcessError::Io(e)),
            Err(e) => {
                return Err(ProcessError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    e.to_string(),
                )))
            }
        }
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let result = run_capture(
            "definitely-not-a-real-binary-xyz",
            &[],
            None,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdin_is_piped_to_stdout() {
        let output = run_capture("cat", &[], Some(b"hello".to_vec()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output, b"hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let args = vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()];
        let err = run_capture("sh", &args, None, Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            ProcessError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let args = vec!["5".to_string()];
        let err = run_capture("sleep", &args, None, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Timeout { .. }));
    }
}
