//! Consultation lead intake.
//!
//! A lead is the visitor's consultation request. It is validated here,
//! rendered into a Markdown notification and handed to a [`LeadNotifier`].
//! Delivery is fire-and-forget from the visitor's point of view: the intake
//! endpoint accepts a valid lead even when the notification fails.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LeadError;

/// Seoul is UTC+9 with no daylight saving.
const KST_OFFSET_SECS: i32 = 9 * 3600;

/// A consultation request as submitted by the site's form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    /// Requested amount in units of 10,000 KRW, as typed.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LeadRequest {
    /// Require the four mandatory fields to be non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), LeadError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("amount", &self.amount),
            ("purpose", &self.purpose),
        ] {
            if value.trim().is_empty() {
                return Err(LeadError::MissingField { field });
            }
        }
        Ok(())
    }

    /// Markdown notification text, with the submission time in KST. Visitor
    /// text is escaped so it cannot open or close an entity.
    #[must_use]
    pub fn render_message(&self, received_at: DateTime<Utc>) -> String {
        let mut text = format!(
            "🏦 *새로운 대출 상담 신청*\n\n\
             👤 *이름:* {}\n\
             📞 *연락처:* {}\n\
             💰 *희망 대출 금액:* {}만원\n\
             🎯 *대출 목적:* {}\n",
            escape_markdown(self.name.trim()),
            escape_markdown(self.phone.trim()),
            escape_markdown(self.amount.trim()),
            escape_markdown(self.purpose.trim()),
        );
        if let Some(message) = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            text.push_str(&format!("💬 *추가 메시지:* {}\n", escape_markdown(message)));
        }
        text.push_str(&format!("\n⏰ *신청 시간:* {}", format_kst(received_at)));
        text
    }
}

/// Backslash-escape the characters that start an entity in Telegram's legacy
/// Markdown: `_`, `*`, `` ` `` and `[`.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `YYYY. MM. DD. HH:MM:SS` in Korea Standard Time.
#[must_use]
pub fn format_kst(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(KST_OFFSET_SECS) {
        Some(kst) => at.with_timezone(&kst).format("%Y. %m. %d. %H:%M:%S").to_string(),
        None => at.format("%Y. %m. %d. %H:%M:%S UTC").to_string(),
    }
}

/// What the notifier reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReceipt {
    /// Message id assigned by the chat service, when it returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

/// Delivers lead notifications.
#[async_trait::async_trait]
pub trait LeadNotifier: Send + Sync {
    /// Short name for logs and health output.
    fn name(&self) -> &'static str;

    /// Send one notification. No retries.
    ///
    /// # Errors
    ///
    /// [`LeadError::NotConfigured`], [`LeadError::Webhook`] or
    /// [`LeadError::Rejected`] depending on where delivery failed.
    async fn notify(&self, lead: &LeadRequest, received_at: DateTime<Utc>) -> Result<NotifyReceipt, LeadError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lead() -> LeadRequest {
        LeadRequest {
            name: "김철수".to_owned(),
            phone: "010-1234-5678".to_owned(),
            amount: "3000".to_owned(),
            purpose: "생활자금".to_owned(),
            message: None,
        }
    }

    #[test]
    fn validate_requires_fields() {
        assert!(lead().validate().is_ok());

        let mut missing = lead();
        missing.phone = "  ".to_owned();
        let err = missing.validate().unwrap_err();
        assert!(matches!(err, LeadError::MissingField { field: "phone" }));
    }

    #[test]
    fn missing_json_fields_fail_validation() {
        let parsed: LeadRequest = serde_json::from_str(r#"{"name":"a","phone":"b"}"#).unwrap();
        assert!(matches!(
            parsed.validate(),
            Err(LeadError::MissingField { field: "amount" })
        ));
    }

    #[test]
    fn message_uses_kst() {
        let at = Utc.with_ymd_and_hms(2025, 9, 25, 15, 30, 0).unwrap();
        let text = lead().render_message(at);
        assert!(text.starts_with("🏦 *새로운 대출 상담 신청*"));
        assert!(text.contains("💰 *희망 대출 금액:* 3000만원"));
        assert!(!text.contains("추가 메시지"));
        assert!(text.ends_with("2025. 09. 26. 00:30:00"));

        let mut with_note = lead();
        with_note.message = Some("오후에 연락 주세요".to_owned());
        assert!(with_note.render_message(at).contains("💬 *추가 메시지:* 오후에 연락 주세요"));
    }

    #[test]
    fn visitor_text_cannot_break_markdown() {
        let mut odd = lead();
        odd.name = "kim_*cs*".to_owned();
        odd.purpose = "[사업자] `운영`자금".to_owned();
        odd.message = Some("a_b".to_owned());

        let text = odd.render_message(Utc::now());
        assert!(text.contains(r"👤 *이름:* kim\_\*cs\*"));
        assert!(text.contains(r"🎯 *대출 목적:* \[사업자] \`운영\`자금"));
        assert!(text.contains(r"💬 *추가 메시지:* a\_b"));
        assert_eq!(escape_markdown("010-1234-5678"), "010-1234-5678");
    }
}
