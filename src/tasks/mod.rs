//! Background scheduled tasks for the application.
//!
//! Currently only the subscription follow-up mailer runs here.
//! Call `spawn_all` once during startup to launch it.

use crate::services::SubscriptionService;

/// 邀请邮件检查间隔
const FOLLOW_UP_INTERVAL_SECS: u64 = 30 * 60;

/// Spawn all background tasks.
///
/// The task is detached via `tokio::spawn`; this function does not block.
pub fn spawn_all(subscription_service: SubscriptionService) {
    // 验证 24 小时后发送邀请邮件（每 30 分钟）
    {
        let svc = subscription_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.send_follow_ups().await {
                    Ok(n) if n > 0 => log::info!("Follow-up emails sent: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to send follow-up emails: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(FOLLOW_UP_INTERVAL_SECS)).await;
            }
        });
    }
}
