//! Ticket e-mail delivery through an HTTP mail API.

use tracing::{debug, info};

use tickethub_core::config::MailConfig;
use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::event::Event;
use tickethub_entity::session::EventSession;
use tickethub_entity::ticket::Ticket;

/// Sends transactional ticket e-mails.
///
/// Delivery is best-effort: issuance commits before mail is attempted and
/// callers log failures instead of propagating them, so a mail outage never
/// blocks ticket sales.
#[derive(Debug, Clone)]
pub struct Mailer {
    /// Mail configuration.
    config: MailConfig,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl Mailer {
    /// Creates a new mailer.
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Sends the issued tickets to the applicant.
    ///
    /// Returns `Ok(())` without doing anything when mail is disabled.
    pub async fn send_tickets_issued(
        &self,
        event: &Event,
        session: &EventSession,
        tickets: &[Ticket],
    ) -> AppResult<()> {
        let Some(first) = tickets.first() else {
            return Ok(());
        };
        if !self.config.enabled {
            debug!(email = %first.email, "Mail disabled, skipping ticket delivery");
            return Ok(());
        }

        let body = serde_json::json!({
            "from": self.config.from,
            "to": [first.email],
            "subject": format!("Your tickets for {}", event.name),
            "html": self.render_tickets_html(event, session, tickets),
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Mail, "Failed to reach mail API", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::mail(format!(
                "Mail API returned {status}: {detail}"
            )));
        }

        info!(email = %first.email, ticket_count = tickets.len(), "Sent ticket e-mail");
        Ok(())
    }

    fn render_tickets_html(
        &self,
        event: &Event,
        session: &EventSession,
        tickets: &[Ticket],
    ) -> String {
        let mut html = format!(
            "<h1>{}</h1>\
             <p>{} / {} / {}</p>\
             <p>Dear {}, your tickets are ready. Present the QR code below at the door.</p>",
            event.name,
            session.name,
            session.starts_at.format("%Y-%m-%d %H:%M UTC"),
            session.location,
            tickets[0].name,
        );
        for ticket in tickets {
            let label = if ticket.is_group {
                format!("Group ticket for {} people", ticket.group_size)
            } else {
                "Individual ticket".to_string()
            };
            html.push_str(&format!(
                "<p>{label}<br><a href=\"{base}/tickets/{code}\">{base}/tickets/{code}</a></p>",
                base = self.config.public_base_url,
                code = ticket.code,
            ));
        }
        html
    }
}
