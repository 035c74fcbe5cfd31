use crate::config::{FrontendConfig, MailgunConfig};
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub id: Option<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct MailgunService {
    client: Client,
    config: MailgunConfig,
    frontend_url: String,
}

impl MailgunService {
    pub fn new(config: MailgunConfig, frontend: &FrontendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            frontend_url: frontend.url.clone(),
        }
    }

    /// 未配置 API Key 时不实际发送
    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.domain
        )
    }

    /// 发送订阅确认邮件（Mailgun 模板）
    pub async fn send_confirmation_email(
        &self,
        email: &str,
        username: &str,
        verification_token: &str,
    ) -> AppResult<()> {
        let variables = json!({
            "email": email,
            "url": self.frontend_url,
            "verificationToken": verification_token,
            "username": username,
        })
        .to_string();

        let params = [
            ("from", self.config.from.as_str()),
            ("to", email),
            ("subject", "Email Confirmation"),
            ("template", self.config.confirm_template.as_str()),
            ("h:X-Mailgun-Variables", variables.as_str()),
        ];

        self.send(email, &params).await
    }

    /// 验证成功后的欢迎邮件
    pub async fn send_welcome_email(&self, email: &str, username: &str) -> AppResult<()> {
        let variables = json!({
            "email": email,
            "url": self.frontend_url,
            "username": username,
        })
        .to_string();

        let params = [
            ("from", self.config.from.as_str()),
            ("to", email),
            ("subject", "Welcome Email"),
            ("template", self.config.welcome_template.as_str()),
            ("h:X-Mailgun-Variables", variables.as_str()),
        ];

        self.send(email, &params).await
    }

    /// 通知推荐人：被推荐的邮箱已完成验证
    pub async fn send_referral_success_email(
        &self,
        email: &str,
        username: &str,
        points: i64,
    ) -> AppResult<()> {
        let variables = json!({
            "email": email,
            "url": self.frontend_url,
            "username": username,
            "points": points,
        })
        .to_string();

        let params = [
            ("from", self.config.from.as_str()),
            ("to", email),
            ("subject", "Successful Referral"),
            ("template", self.config.referral_template.as_str()),
            ("h:X-Mailgun-Variables", variables.as_str()),
        ];

        self.send(email, &params).await
    }

    /// 管理员群发的自定义 HTML 邮件
    pub async fn send_custom_email(&self, email: &str, subject: &str, html: &str) -> AppResult<()> {
        let params = [
            ("from", self.config.from.as_str()),
            ("to", email),
            ("subject", subject),
            ("html", html),
        ];

        self.send(email, &params).await
    }

    /// 发送验证后的邀请邮件
    pub async fn send_invite_email(&self, email: &str, username: &str) -> AppResult<()> {
        let text =
            format!("Hey {username}, thanks for verifying. Invite friends and earn rewards!");

        let params = [
            ("from", self.config.from.as_str()),
            ("to", email),
            ("subject", "Invite friends and earn rewards"),
            ("text", text.as_str()),
        ];

        self.send(email, &params).await
    }

    async fn send(&self, email: &str, params: &[(&str, &str)]) -> AppResult<()> {
        if !self.is_enabled() {
            log::warn!("Mailgun API key not configured, skip sending email to {email}");
            return Ok(());
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(params)
            .send()
            .await?;

        if response.status().is_success() {
            let body: SendMessageResponse = response.json().await?;
            log::info!(
                "Email sent successfully: {email}, id: {}",
                body.id.unwrap_or_default()
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Email failed to send: {email}, status: {status}, error: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Email sending failed: {error_text}"
            )))
        }
    }
}
