use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::Config;

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    /// Returns None if SMTP is not fully configured.
    pub fn new(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let username = config.smtp_username.clone()?;
        let password = config.smtp_password.clone()?;
        let from_addr = config.smtp_from.as_deref()?;

        let port = config.smtp_port.unwrap_or(587);
        let creds = Credentials::new(username, password);

        let transport = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .ok()?
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .credentials(creds)
                .build()
        };

        let from: Mailbox = from_addr.parse().ok()?;

        Some(Self { transport, from })
    }

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    async fn enviar(
        &self,
        to: Mailbox,
        subject: &str,
        text: &str,
        html: &str,
    ) -> anyhow::Result<()> {
        let email = Message::builder()
            .message_id(Some(self.new_message_id()))
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .context("Failed to build email message")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send email")?;

        Ok(())
    }

    /// Notifica la resolución de una solicitud de rol.
    pub async fn enviar_solicitud_resuelta(
        &self,
        to_email: &str,
        to_name: &str,
        rol: &str,
        aprobada: bool,
    ) -> anyhow::Result<()> {
        let to: Mailbox = format!("{to_name} <{to_email}>")
            .parse()
            .or_else(|_| to_email.parse())
            .context("Invalid recipient address")?;

        let (subject, veredicto) = if aprobada {
            (format!("Solicitud de rol aprobada — {rol}"), "aprobada")
        } else {
            (format!("Solicitud de rol rechazada — {rol}"), "rechazada")
        };

        let text = format!(
            "Hola {to_name},\n\n\
            Tu solicitud para el rol de {rol} fue {veredicto}.\n\n\
            Si tienes dudas, responde a este correo."
        );

        let html = format!(
            r#"<p style="font-size:15px;color:#334155;line-height:1.7">Hola <strong>{to_name}</strong>,<br><br>
Tu solicitud para el rol de <strong>{rol}</strong> fue <strong>{veredicto}</strong>.<br><br>
Si tienes dudas, responde a este correo.</p>"#
        );

        self.enviar(to, &subject, &text, &html).await
    }
}
