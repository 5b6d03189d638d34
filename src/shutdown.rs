//! 优雅退出：监听 SIGINT / SIGTERM（Windows 下为 Ctrl+C）

use tracing::info;

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

/// 注册信号处理器并返回等待退出的 future。
///
/// 注册失败在启动阶段就会暴露，而不是等到真正收到信号时。
#[cfg(unix)]
pub fn shutdown_signal()
-> Result<impl std::future::Future<Output = ShutdownReason> + Send + 'static, ShutdownError> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint =
        signal(SignalKind::interrupt()).map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;

    Ok(async move {
        let reason = tokio::select! {
            _ = sigint.recv() => ShutdownReason::Interrupt,
            _ = sigterm.recv() => ShutdownReason::Terminate,
        };
        info!("接收到退出信号: {:?}", reason);
        reason
    })
}

#[cfg(windows)]
pub fn shutdown_signal()
-> Result<impl std::future::Future<Output = ShutdownReason> + Send + 'static, ShutdownError> {
    Ok(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("监听Ctrl+C信号失败: {}", e);
            std::future::pending::<()>().await;
        }
        info!("接收到Ctrl+C信号");
        ShutdownReason::Interrupt
    })
}
