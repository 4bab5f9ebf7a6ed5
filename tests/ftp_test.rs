// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end FTP transfers against an in-process server.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use vipwrap::{ConnectOptions, Endpoint, FileSource, GdiClient, NetworkConnector, send_file};

#[derive(Default)]
struct FakeFs {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    commands: Vec<String>,
    connections: usize,
}

type Shared = Arc<Mutex<FakeFs>>;

struct FakeFtpServer {
    port: u16,
    fs: Shared,
}

impl FakeFtpServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let fs: Shared = Arc::default();
        {
            let mut fs = fs.lock().unwrap();
            fs.dirs.insert("/".to_string());
            fs.dirs.insert("/inbound".to_string());
        }

        let shared = Arc::clone(&fs);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                shared.lock().unwrap().connections += 1;
                tokio::spawn(serve(stream, Arc::clone(&shared)));
            }
        });
        Self { port, fs }
    }

    fn options(&self) -> ConnectOptions {
        ConnectOptions {
            ftp_port: self.port,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    fn client(&self) -> GdiClient {
        GdiClient::new(NetworkConnector::new(self.options()))
    }

    fn commands(&self) -> Vec<String> {
        self.fs.lock().unwrap().commands.clone()
    }

    fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.fs.lock().unwrap().files.get(path).cloned()
    }
}

fn resolve(cwd: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.trim_end_matches('/').to_string()
    } else if cwd == "/" {
        format!("/{name}")
    } else {
        format!("{cwd}/{name}")
    }
}

async fn serve(stream: TcpStream, fs: Shared) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut cwd = "/".to_string();
    let mut logged_in = false;
    let mut passive: Option<TcpListener> = None;

    write.write_all(b"220 fake ready\r\n").await.unwrap();
    while let Ok(Some(line)) = lines.next_line().await {
        let (cmd, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let cmd = cmd.to_ascii_uppercase();
        let logged = if cmd == "PASS" { "PASS ****".to_string() } else { line.clone() };
        fs.lock().unwrap().commands.push(logged);

        let reply: String = match cmd.as_str() {
            "USER" => "331 Password required".into(),
            "PASS" if arg == "secret" => {
                logged_in = true;
                "230 Logged in".into()
            }
            "PASS" => "530 Login incorrect.".into(),
            _ if !logged_in && cmd != "QUIT" => "530 Please login".into(),
            "TYPE" => "200 Type set to I".into(),
            "CWD" => {
                let dir = resolve(&cwd, arg);
                if fs.lock().unwrap().dirs.contains(&dir) {
                    cwd = dir;
                    "250 Directory changed".into()
                } else {
                    "550 No such directory".into()
                }
            }
            "EPSV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                let port = listener.local_addr().unwrap().port();
                passive = Some(listener);
                format!("229 Entering Extended Passive Mode (|||{port}|)")
            }
            "STOR" => {
                let Some(listener) = passive.take() else {
                    write.write_all(b"425 Use EPSV first\r\n").await.unwrap();
                    continue;
                };
                write.write_all(b"150 Ok to send data\r\n").await.unwrap();
                let (mut data, _) = listener.accept().await.unwrap();
                let mut content = Vec::new();
                data.read_to_end(&mut content).await.unwrap();
                fs.lock().unwrap().files.insert(resolve(&cwd, arg), content);
                "226 Transfer complete".into()
            }
            "RETR" => {
                let content = fs.lock().unwrap().files.get(&resolve(&cwd, arg)).cloned();
                match (content, passive.take()) {
                    (Some(content), Some(listener)) => {
                        write.write_all(b"150 Opening data connection\r\n").await.unwrap();
                        let (mut data, _) = listener.accept().await.unwrap();
                        data.write_all(&content).await.unwrap();
                        data.shutdown().await.unwrap();
                        "226 Transfer complete".into()
                    }
                    _ => "550 Failed to open file".into(),
                }
            }
            "NLST" => {
                let Some(listener) = passive.take() else {
                    write.write_all(b"425 Use EPSV first\r\n").await.unwrap();
                    continue;
                };
                let prefix = if cwd == "/" { "/".to_string() } else { format!("{cwd}/") };
                let names: Vec<String> = fs
                    .lock()
                    .unwrap()
                    .files
                    .keys()
                    .filter_map(|p| p.strip_prefix(&prefix))
                    .filter(|n| !n.contains('/'))
                    .map(str::to_string)
                    .collect();
                write.write_all(b"150 Here comes the listing\r\n").await.unwrap();
                let (mut data, _) = listener.accept().await.unwrap();
                for name in names {
                    data.write_all(format!("{name}\r\n").as_bytes()).await.unwrap();
                }
                data.shutdown().await.unwrap();
                "226 Directory send OK".into()
            }
            "SIZE" => {
                let len = fs.lock().unwrap().files.get(&resolve(&cwd, arg)).map(Vec::len);
                match len {
                    Some(len) => format!("213 {len}"),
                    None => "550 Could not get file size.".into(),
                }
            }
            "DELE" => {
                let removed = fs.lock().unwrap().files.remove(&resolve(&cwd, arg));
                match removed {
                    Some(_) => "250 Delete operation successful".into(),
                    None => "550 Delete operation failed".into(),
                }
            }
            "QUIT" => {
                write.write_all(b"221 Goodbye\r\n").await.unwrap();
                break;
            }
            _ => "502 Command not implemented".into(),
        };
        write.write_all(format!("{reply}\r\n").as_bytes()).await.unwrap();
    }
    fs.lock().unwrap().commands.push("CLOSED".to_string());
}

fn ftp_endpoint(password: &str, folder: &str) -> Endpoint {
    // the port is ignored for FTP, the connector's ftp_port is used
    Endpoint::parse("ftp", "127.0.0.1", 0, "vip", password, folder).unwrap()
}

async fn wait_closed(server: &FakeFtpServer) {
    for _ in 0..50 {
        if server.commands().iter().any(|c| c == "CLOSED") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("control connection was not closed: {:?}", server.commands());
}

#[tokio::test]
async fn test_ftp_upload_is_byte_identical() {
    let server = FakeFtpServer::start().await;
    let content: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    let sent = server
        .client()
        .send_file(
            &ftp_endpoint("secret", "/inbound"),
            FileSource::from_bytes("85_ORDERS_1_20250102_030405.DAT", content.clone()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(sent, content.len() as u64);
    assert_eq!(
        server.file("/inbound/85_ORDERS_1_20250102_030405.DAT"),
        Some(content)
    );
    wait_closed(&server).await;
    let commands = server.commands();
    assert!(commands.contains(&"TYPE I".to_string()));
    assert!(commands.contains(&"PASS ****".to_string()));
    assert!(commands.contains(&"QUIT".to_string()));
}

#[tokio::test]
async fn test_ftp_empty_stream() {
    let server = FakeFtpServer::start().await;

    server
        .client()
        .send_file(
            &ftp_endpoint("secret", "/inbound"),
            FileSource::new("empty.DAT", tokio::io::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(server.file("/inbound/empty.DAT"), Some(Vec::new()));
}

#[tokio::test]
async fn test_ftp_bad_password_quits() {
    let server = FakeFtpServer::start().await;

    let err = server
        .client()
        .send_file(
            &ftp_endpoint("wrong", "/inbound"),
            FileSource::from_bytes("a.DAT", b"x".to_vec()).unwrap(),
        )
        .await
        .unwrap_err();

    assert!(err.is_authentication(), "unexpected error: {err}");
    assert!(err.to_string().contains("530 Login incorrect."));
    wait_closed(&server).await;
    assert!(server.commands().contains(&"QUIT".to_string()));
    assert!(server.fs.lock().unwrap().files.is_empty());
}

#[tokio::test]
async fn test_ftp_missing_folder() {
    let server = FakeFtpServer::start().await;

    let err = server
        .client()
        .send_file(
            &ftp_endpoint("secret", "/missing"),
            FileSource::from_bytes("a.DAT", b"x".to_vec()).unwrap(),
        )
        .await
        .unwrap_err();

    assert!(err.is_remote_operation(), "unexpected error: {err}");
    assert!(err.to_string().contains("550"));
    wait_closed(&server).await;
    assert!(server.commands().contains(&"QUIT".to_string()));
}

#[tokio::test]
async fn test_invalid_method_never_connects() {
    let server = FakeFtpServer::start().await;

    let err = send_file(
        "scp",
        "127.0.0.1",
        server.port,
        "vip",
        "secret",
        "/inbound",
        FileSource::from_bytes("a.DAT", b"x".to_vec()).unwrap(),
    )
    .await
    .unwrap_err();

    assert!(err.is_invalid_argument());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.fs.lock().unwrap().connections, 0);
}

#[tokio::test]
async fn test_ftp_download_and_delete() {
    let server = FakeFtpServer::start().await;
    {
        let mut fs = server.fs.lock().unwrap();
        fs.files
            .insert("/inbound/EXPORT_1.DAT".to_string(), b"first".to_vec());
        fs.files
            .insert("/inbound/EXPORT_2.DAT".to_string(), b"second".to_vec());
        fs.files.insert("/inbound/KEEP.DAT".to_string(), b"keep".to_vec());
    }
    let client = server.client();
    let target = ftp_endpoint("secret", "/inbound");
    let dir = TempDir::new().unwrap();

    let saved = client
        .download_files(&target, "EXPORT_", dir.path(), true)
        .await
        .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(std::fs::read(dir.path().join("EXPORT_1.DAT")).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.path().join("EXPORT_2.DAT")).unwrap(), b"second");
    assert_eq!(server.file("/inbound/EXPORT_1.DAT"), None);

    assert!(client.delete_file(&target, "KEEP.DAT").await.unwrap());
    assert!(!client.delete_file(&target, "KEEP.DAT").await.unwrap());
    assert!(server.fs.lock().unwrap().files.is_empty());
}
