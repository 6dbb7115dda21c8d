use std::future::{pending, Future};
use std::io;

use chrono::Local;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{timeout, Duration, Instant};

use super::error::{Result, TwitchError};
use super::keepalive;
use super::messages::IrcLine;
use super::rate_limit::RateLimiter;
use crate::backend::commands::{CommandDispatcher, CommandParser, CommandRegistry};
use crate::backend::config::{SessionConfig, Settings};

pub const SERVER: &str = "irc.chat.twitch.tv";
pub const PORT: u16 = 6667;

/// Longest inbound line kept; the rest of a longer line is discarded
pub const MAX_LINE_LEN: usize = 4096;

const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Session lifecycle. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    HandshakeSent,
    Active,
    Closed,
}

/// What one trip to the transport produced
enum ReadOutcome {
    Line(String),
    Eof,
    TimedOut,
    Shutdown,
    Failed(io::Error),
}

/// A single-channel chat connection.
///
/// Owns the transport exclusively. Every outbound line, PONGs included,
/// goes through the rate limiter; denied lines are dropped.
pub struct Session<S> {
    config: SessionConfig,
    greeting: String,
    dispatcher: CommandDispatcher,
    limiter: RateLimiter,
    transport: Option<BufReader<S>>,
    state: SessionState,
    read_timeout: Option<Duration>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(config: SessionConfig, settings: &Settings) -> Self {
        let mut registry = CommandRegistry::with_builtins();
        registry.extend(settings.commands.iter().cloned());

        let dispatcher = CommandDispatcher::new(
            registry,
            CommandParser::with_default_prefix(settings.match_mode),
            config.nick.clone(),
            Local::now(),
        );

        Self {
            greeting: settings.greeting.replace("{nick}", &config.nick),
            config,
            dispatcher,
            limiter: RateLimiter::new(settings.rate_limit, Instant::now()),
            transport: None,
            state: SessionState::Disconnected,
            read_timeout: settings.read_timeout(),
        }
    }

    /// Hand an already connected stream to the session.
    /// The rate window starts now.
    pub fn attach(&mut self, stream: S) {
        self.transport = Some(BufReader::new(stream));
        self.limiter = RateLimiter::new(self.limiter.ceiling(), Instant::now());
        self.state = SessionState::Connecting;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run until the server closes the connection
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(pending()).await
    }

    /// Handshake, then read and react to lines until the connection ends
    /// or `shutdown` completes. Mid-session I/O errors end the session
    /// normally; only a missing transport is an error.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.transport.is_none() {
            return Err(TwitchError::IoError("no transport attached".to_string()));
        }

        self.handshake().await;
        if self.state == SessionState::HandshakeSent {
            self.state = SessionState::Active;
        }

        tokio::pin!(shutdown);
        let mut buf = Vec::with_capacity(MAX_LINE_LEN);

        while self.state == SessionState::Active {
            let read_timeout = self.read_timeout;
            let transport = match self.transport.as_mut() {
                Some(transport) => transport,
                None => break,
            };

            let outcome = tokio::select! {
                _ = &mut shutdown => ReadOutcome::Shutdown,
                outcome = next_line(transport, &mut buf, read_timeout) => outcome,
            };

            match outcome {
                ReadOutcome::Line(raw) => self.handle_line(&raw).await,
                ReadOutcome::Eof => {
                    println!(
                        "-- {} closed the connection. {}",
                        SERVER,
                        Local::now().format(TIMESTAMP_FORMAT)
                    );
                    self.close().await;
                }
                ReadOutcome::TimedOut => {
                    log::warn!("No data from {} within {:?}, giving up", SERVER, read_timeout);
                    self.close().await;
                }
                ReadOutcome::Shutdown => {
                    log::info!("Shutdown requested");
                    self.close().await;
                }
                ReadOutcome::Failed(e) => {
                    log::error!("Read failed: {}", e);
                    self.close().await;
                }
            }
        }

        Ok(())
    }

    /// Release the transport. Safe to call any number of times.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.shutdown().await {
                log::debug!("Shutdown of transport failed: {}", e);
            }
            log::info!("Disconnected at {}", Local::now().format(TIMESTAMP_FORMAT));
        }
        self.state = SessionState::Closed;
    }

    async fn handshake(&mut self) {
        let lines = [
            format!("PASS {}", self.config.token.to_lowercase()),
            format!("NICK {}", self.config.nick.to_lowercase()),
            "CAP REQ :twitch.tv/tags".to_string(),
            format!("JOIN {}", self.config.channel),
            self.privmsg(&self.greeting),
        ];

        for line in &lines {
            self.send(line).await;
        }

        if self.state == SessionState::Connecting {
            self.state = SessionState::HandshakeSent;
        }
    }

    async fn handle_line(&mut self, raw: &str) {
        let line = IrcLine::parse(raw);
        let chat = line.chat(&self.config.channel);

        if chat.is_user_message() {
            println!("<- {} says: {}", chat.display_name, chat.body);
        } else {
            println!("<- {}", line.raw);
        }

        if let Some(reply) = self
            .dispatcher
            .dispatch(&chat.display_name, &chat.body.to_lowercase())
        {
            let message = self.privmsg(&reply);
            self.send(&message).await;
        }

        if let Some(pong) = keepalive::pong_for(raw) {
            self.send(&pong).await;
        }
    }

    /// Send one line if the rate window allows it. Returns whether it went out.
    async fn send(&mut self, line: &str) -> bool {
        if !self.limiter.allow(Instant::now()) {
            log::warn!("Rate limit reached, dropping: {}", masked(line));
            return false;
        }

        let result = match self.transport.as_mut() {
            Some(transport) => write_line(transport, line).await,
            None => return false,
        };

        match result {
            Ok(()) => {
                println!("-> {}", masked(line));
                log::trace!("{} sends left in this window", self.limiter.remaining());
                true
            }
            Err(e) => {
                log::error!("Write failed: {}", e);
                self.close().await;
                false
            }
        }
    }

    fn privmsg(&self, text: &str) -> String {
        format!("PRIVMSG {} :{}", self.config.channel, text)
    }
}

impl Session<TcpStream> {
    /// Resolve and connect to the Twitch chat server
    pub async fn connect(&mut self) -> Result<()> {
        self.connect_to(SERVER, PORT).await
    }

    pub async fn connect_to(&mut self, host: &str, port: u16) -> Result<()> {
        self.state = SessionState::Connecting;

        log::info!("Resolving server's IP address for [{}]", host);
        let addrs: Vec<_> = lookup_host((host, port))
            .await
            .map_err(|e| TwitchError::ResolveError(format!("{}: {}", host, e)))?
            .collect();
        if addrs.is_empty() {
            return Err(TwitchError::ResolveError(format!("{}: no addresses", host)));
        }

        log::info!("Connecting to {}:{}", host, port);
        let stream = TcpStream::connect(&addrs[..])
            .await
            .map_err(|e| TwitchError::ConnectError(format!("{}:{}: {}", host, port, e)))?;

        self.attach(stream);
        Ok(())
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            log::debug!("Session dropped with an open transport, releasing it");
        }
    }
}

/// The PASS token never reaches the console
fn masked(line: &str) -> &str {
    if line.starts_with("PASS ") {
        "PASS ***"
    } else {
        line
    }
}

async fn write_line<W>(writer: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
    writer.flush().await
}

async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>, limit: Option<Duration>) -> ReadOutcome
where
    R: AsyncBufRead + Unpin,
{
    let result = match limit {
        Some(limit) => match timeout(limit, read_line(reader, buf)).await {
            Ok(result) => result,
            Err(_) => return ReadOutcome::TimedOut,
        },
        None => read_line(reader, buf).await,
    };

    match result {
        Ok(0) => ReadOutcome::Eof,
        Ok(_) => ReadOutcome::Line(String::from_utf8_lossy(buf).into_owned()),
        Err(e) => ReadOutcome::Failed(e),
    }
}

/// Read one line of at most [`MAX_LINE_LEN`] bytes into `buf`.
/// Anything past the limit, up to the next LF, is thrown away.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader)
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', buf)
        .await?;

    if n == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
        log::warn!("Inbound line longer than {} bytes, truncating", MAX_LINE_LEN);
        discard_until_newline(reader).await?;
    }

    Ok(n)
}

async fn discard_until_newline<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
