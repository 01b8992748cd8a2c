use crate::core::app::App;
use crate::core::backend::Backend;
use crate::core::invoker::{BackendInvoker, InvokeError};
use crate::core::process::ProcessManager;
use crate::core::session::ChatSession;
use crate::core::store::ConversationStore;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// App over a temp store with models `a` and `b`; only `a` is installed.
pub fn create_test_app() -> (App, TempDir) {
    create_test_app_with(FakeInvoker::new())
}

pub fn create_test_app_with(invoker: FakeInvoker) -> (App, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let session = ChatSession::new(
        ConversationStore::new(dir.path(), "a"),
        Box::new(invoker),
    );
    let processes = FakeProcessManager {
        installed: "NAME ID SIZE MODIFIED\na:latest 123 1 GB now\n".to_string(),
        ..Default::default()
    };
    let app = App::new(
        session,
        Box::new(processes),
        vec!["a".to_string(), "b".to_string()],
    );
    (app, dir)
}

/// One HTTP request as seen by [`serve_once`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

async fn read_http_request(stream: &mut tokio::net::TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

/// Accepts a single connection, answers with `status` and a JSON `body`,
/// and hands back what the client sent.
pub async fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, JoinHandle<Result<CapturedRequest, String>>) {
    let reason = if status == 200 { "OK" } else { "Error" };
    serve_raw(format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ))
    .await
}

/// Answers one request with `response` verbatim, then closes the connection.
pub async fn serve_raw(response: String) -> (String, JoinHandle<Result<CapturedRequest, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let captured = read_http_request(&mut stream).await?;
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        stream.shutdown().await.map_err(|err| err.to_string())?;
        Ok(captured)
    });

    (format!("http://{addr}"), server)
}

/// Scripted invoker that records every call.
#[derive(Default)]
pub struct FakeInvoker {
    replies: Mutex<VecDeque<Result<String, InvokeError>>>,
    calls: Mutex<Vec<(String, Backend)>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, InvokeError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Backend)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl BackendInvoker for FakeInvoker {
    async fn invoke(&self, prompt: &str, backend: &Backend) -> Result<String, InvokeError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((prompt.to_string(), backend.clone()));
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply from {backend}")))
    }
}

/// In-memory process table.
#[derive(Default)]
pub struct FakeProcessManager {
    pub running: Mutex<HashSet<String>>,
    pub launches: Mutex<Vec<(String, Vec<String>)>>,
    pub installed: String,
    pub fail_queries: bool,
    pub fail_starts: bool,
}

impl FakeProcessManager {
    pub fn with_running<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            running: Mutex::new(patterns.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Every launch attempted so far, successful or not.
    pub fn started(&self) -> Vec<(String, Vec<String>)> {
        self.launches.lock().expect("launches lock").clone()
    }
}

#[async_trait]
impl ProcessManager for FakeProcessManager {
    async fn is_running(&self, pattern: &str) -> std::io::Result<bool> {
        if self.fail_queries {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "pgrep not found",
            ));
        }
        Ok(self.running.lock().expect("running lock").contains(pattern))
    }

    async fn start(&self, program: &str, args: &[&str]) -> std::io::Result<()> {
        self.launches.lock().expect("launches lock").push((
            program.to_string(),
            args.iter().map(|arg| arg.to_string()).collect(),
        ));
        if self.fail_starts {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{program} not found"),
            ));
        }
        self.running
            .lock()
            .expect("running lock")
            .insert(format!("{program} {}", args.join(" ")));
        Ok(())
    }

    async fn list_installed(&self) -> std::io::Result<String> {
        if self.fail_queries {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "ollama not found",
            ));
        }
        Ok(self.installed.clone())
    }
}
