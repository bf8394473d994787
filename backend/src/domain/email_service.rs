use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::{
    transport::smtp::authentication::Credentials,
    transport::smtp::client::{Tls, TlsParameters},
    Message, SmtpTransport, Transport,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::EmailKind;
use crate::domain::models::client::DomainClient;
use crate::domain::models::quote::DomainQuote;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
        }
    }
}

impl EmailConfig {
    /// True when SMTP credentials have actually been filled in.
    pub fn is_configured(&self) -> bool {
        !self.smtp_server.is_empty() && !self.username.is_empty() && !self.from_email.is_empty()
    }
}

/// Sends lifecycle emails to clients. When no SMTP credentials are
/// configured the service logs the email instead of failing, so the
/// lifecycle keeps working in development.
pub struct EmailService {
    config: EmailConfig,
    transport: Option<SmtpTransport>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        if !self.config.is_configured() {
            info!("No SMTP credentials configured, emails will be logged only");
            return Ok(());
        }

        info!(
            "Initializing email service for SMTP server: {}:{}",
            self.config.smtp_server, self.config.smtp_port
        );

        let tls_params = TlsParameters::new(self.config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = SmtpTransport::relay(&self.config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(self.config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        self.transport = Some(transport);
        info!("Email service initialized successfully");
        Ok(())
    }

    fn subject_and_body(
        &self,
        kind: EmailKind,
        quote: &DomainQuote,
        client: &DomainClient,
    ) -> (String, String) {
        match kind {
            EmailKind::QuoteToClient => (
                format!("Votre devis - {}", quote.description),
                format!(
                    "Bonjour {},\n\nVeuillez trouver votre devis \"{}\".\n\nTotal HT : {:.2} EUR\nTotal TTC : {:.2} EUR\nAcompte demandé : {:.2} EUR\n\nCordialement",
                    client.name, quote.description, quote.total_ht, quote.total_ttc, quote.deposit_amount
                ),
            ),
            EmailKind::ReminderToClient => (
                format!("Relance - devis \"{}\"", quote.description),
                format!(
                    "Bonjour {},\n\nSans réponse de votre part, nous nous permettons de vous relancer au sujet du devis \"{}\" ({:.2} EUR TTC).\n\nCordialement",
                    client.name, quote.description, quote.total_ttc
                ),
            ),
            EmailKind::AcceptanceNotice => (
                format!("Devis accepté - {}", quote.description),
                format!(
                    "Bonjour {},\n\nNous confirmons l'acceptation du devis \"{}\". Un acompte de {:.2} EUR vous sera facturé.\n\nCordialement",
                    client.name, quote.description, quote.deposit_amount
                ),
            ),
            EmailKind::DepositReceipt => (
                format!("Acompte reçu - {}", quote.description),
                format!(
                    "Bonjour {},\n\nNous accusons réception de votre acompte de {:.2} EUR pour le devis \"{}\".\n\nCordialement",
                    client.name, quote.deposit_amount, quote.description
                ),
            ),
            EmailKind::AutoRefusalNotice => (
                format!("Devis clos - {}", quote.description),
                format!(
                    "Bonjour {},\n\nSans réponse de votre part, le devis \"{}\" a été classé sans suite. N'hésitez pas à nous recontacter.\n\nCordialement",
                    client.name, quote.description
                ),
            ),
        }
    }

    /// Send (or log) a lifecycle email about a quote.
    pub fn send_quote_email(
        &self,
        kind: EmailKind,
        quote: &DomainQuote,
        client: &DomainClient,
    ) -> Result<()> {
        let (subject, body) = self.subject_and_body(kind, quote, client);

        let transport = match &self.transport {
            Some(transport) => transport,
            None => {
                info!(
                    "Email (not sent, SMTP unconfigured) to {}: {}",
                    client.email, subject
                );
                return Ok(());
            }
        };

        let email = Message::builder()
            .from(
                self.config
                    .from_email
                    .parse::<Mailbox>()
                    .context("Failed to parse from email")?,
            )
            .to(client
                .email
                .parse::<Mailbox>()
                .context("Failed to parse client email")?)
            .subject(subject.clone())
            .body(body)
            .context("Failed to build email")?;

        transport.send(&email).context("Failed to send email")?;
        info!("Email sent to {}: {}", client.email, subject);
        Ok(())
    }
}
