use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use native_tls::TlsConnector;
use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::EmailConfig;
use crate::domain::email::EmailRecord;
use crate::mail::decoders::{header_text, normalize_snippet};
use crate::mail::mime::MessagePart;

/// The handful of IMAP commands one run needs.
pub trait MailboxSession {
    fn select_folder(&mut self, folder: &str) -> Result<()>;

    /// Sequence numbers matching `query`, ascending.
    fn search_ids(&mut self, query: &str) -> Result<Vec<u32>>;

    /// Full RFC 822 bytes of one message, without setting `\Seen`.
    fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>>;

    fn close_and_logout(&mut self) -> Result<()>;
}

impl<T: Read + Write> MailboxSession for imap::Session<T> {
    fn select_folder(&mut self, folder: &str) -> Result<()> {
        let mailbox = self.select(folder)?;
        debug!("selected {folder}: {} messages", mailbox.exists);
        Ok(())
    }

    fn search_ids(&mut self, query: &str) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self.search(query)?.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>> {
        let fetches = self.fetch(id.to_string(), "BODY.PEEK[]")?;
        let f = fetches
            .iter()
            .next()
            .ok_or_else(|| anyhow!("message {id} not returned by server"))?;
        f.body()
            .map(|b| b.to_vec())
            .ok_or_else(|| anyhow!("message {id}: missing body"))
    }

    fn close_and_logout(&mut self) -> Result<()> {
        // Logout even if CLOSE was refused.
        let closed = self.close();
        self.logout()?;
        closed?;
        Ok(())
    }
}

/// IMAP `SINCE` date for `now - hours`, e.g. `07-Dec-2025`.
pub fn imap_since_date(now: DateTime<Utc>, hours: u32) -> String {
    let cutoff = now
        .checked_sub_signed(Duration::hours(i64::from(hours)))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    cutoff.format("%d-%b-%Y").to_string()
}

/// Connects with the configured settings and returns every unseen message
/// received within the last `since_hours` hours.
pub fn fetch_unread_since(cfg: &EmailConfig, since_hours: u32) -> Result<Vec<EmailRecord>> {
    let since = imap_since_date(Utc::now(), since_hours);
    let mut session = connect(cfg)?;
    collect_unread(session.as_mut(), &cfg.folder, &since)
}

pub fn connect(cfg: &EmailConfig) -> Result<Box<dyn MailboxSession>> {
    let addr = (cfg.host.as_str(), cfg.port);
    debug!(
        "connecting to {}:{} (tls: {})",
        cfg.host, cfg.port, cfg.use_tls
    );

    if cfg.use_tls {
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect(addr, cfg.host.as_str(), &tls)
            .with_context(|| format!("failed to connect to {}:{}", cfg.host, cfg.port))?;
        Ok(Box::new(login(client, cfg)?))
    } else {
        let tcp = TcpStream::connect(addr)
            .with_context(|| format!("failed to connect to {}:{}", cfg.host, cfg.port))?;
        let mut client = imap::Client::new(tcp);
        client
            .read_greeting()
            .context("IMAP server did not send a greeting")?;
        Ok(Box::new(login(client, cfg)?))
    }
}

fn login<T: Read + Write>(client: imap::Client<T>, cfg: &EmailConfig) -> Result<imap::Session<T>> {
    client
        .login(&cfg.username, &cfg.password)
        .map_err(|(e, _client)| anyhow!("IMAP login failed for {}: {e}", cfg.username))
}

/// Selects `folder`, searches `UNSEEN SINCE <since>` and decodes each hit.
///
/// A failed search yields an empty list; a message that cannot be fetched or
/// parsed is skipped. The session is always closed before returning.
pub fn collect_unread(
    session: &mut dyn MailboxSession,
    folder: &str,
    since: &str,
) -> Result<Vec<EmailRecord>> {
    if let Err(e) = session.select_folder(folder) {
        release(session);
        return Err(e.context(format!("failed to select folder {folder}")));
    }

    let query = format!("UNSEEN SINCE {since}");
    debug!("search: {query}");

    let mut out = Vec::new();
    match session.search_ids(&query) {
        Ok(ids) => {
            info!("{} unseen message(s) in {folder} since {since}", ids.len());
            out.reserve(ids.len());
            for id in ids {
                match fetch_record(session, id) {
                    Ok(record) => out.push(record),
                    Err(e) => warn!("skipping message {id}: {e:#}"),
                }
            }
        }
        Err(e) => warn!("search failed, treating as no unread mail: {e:#}"),
    }

    release(session);
    Ok(out)
}

fn fetch_record(session: &mut dyn MailboxSession, id: u32) -> Result<EmailRecord> {
    let raw = session.fetch_raw(id)?;
    parse_record(&raw)
}

/// Decodes one raw RFC 822 message into a record.
pub fn parse_record(raw: &[u8]) -> Result<EmailRecord> {
    let parsed = mailparse::parse_mail(raw)?;

    let snippet = MessagePart::from_parsed(&parsed)
        .first_plain_text()
        .map(normalize_snippet)
        .unwrap_or_default();

    Ok(EmailRecord::new(
        header_text(&parsed.headers, "Subject"),
        header_text(&parsed.headers, "From"),
        header_text(&parsed.headers, "Date"),
        snippet,
    ))
}

fn release(session: &mut dyn MailboxSession) {
    if let Err(e) = session.close_and_logout() {
        warn!("IMAP close/logout failed: {e:#}");
    }
}
