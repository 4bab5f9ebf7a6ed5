// Copyright 2025 Lablup Inc. and Jeongkyu Shin
// Copyright 2023 ByteDance and/or its affiliates.
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

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite};

use super::FtpError;
use super::control::FtpControlChannel;

/// A complete server reply, single or multi line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FtpReply {
    code: u16,
    lines: Vec<String>,
}

fn parse_code(line: &[u8]) -> Result<u16, FtpError> {
    if line.len() < 3 || !line[..3].iter().all(u8::is_ascii_digit) {
        return Err(FtpError::InvalidLineFormat);
    }
    let code = line[..3]
        .iter()
        .fold(0u16, |acc, c| acc * 10 + (c - b'0') as u16);
    if !(100..600).contains(&code) {
        return Err(FtpError::InvalidReplyCode(code));
    }
    Ok(code)
}

fn line_text(line: &[u8]) -> Result<String, FtpError> {
    let text = std::str::from_utf8(line).map_err(|_| FtpError::LineIsNotUtf8)?;
    Ok(text.trim_end().to_string())
}

impl FtpReply {
    #[cfg(test)]
    pub(crate) fn new(code: u16, message: impl Into<String>) -> Self {
        FtpReply {
            code,
            lines: vec![message.into()],
        }
    }

    pub(crate) fn code(&self) -> u16 {
        self.code
    }

    /// Text of the reply without the code, lines joined with a space.
    pub(crate) fn message(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn first_line(&self) -> &str {
        self.lines.first().map(|s| s.trim()).unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_multi_line(&self) -> bool {
        self.lines.len() > 1
    }

    fn bracketed(&self) -> Option<&str> {
        let line = self.first_line();
        let start = line.find('(')?;
        let end = start + line[start..].find(')')?;
        Some(&line[start + 1..end])
    }

    /// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`
    pub(crate) fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let a: Vec<&str> = self.bracketed()?.split(',').map(str::trim).collect();
        if a.len() != 6 {
            return None;
        }

        let h1 = u8::from_str(a[0]).ok()?;
        let h2 = u8::from_str(a[1]).ok()?;
        let h3 = u8::from_str(a[2]).ok()?;
        let h4 = u8::from_str(a[3]).ok()?;
        let p1 = u8::from_str(a[4]).ok()?;
        let p2 = u8::from_str(a[5]).ok()?;

        let ip = IpAddr::V4(Ipv4Addr::new(h1, h2, h3, h4));
        let port = ((p1 as u16) << 8) + (p2 as u16);
        Some(SocketAddr::new(ip, port))
    }

    /// `229 Entering Extended Passive Mode (|||port|)`
    pub(crate) fn parse_epsv_229_reply(&self) -> Option<u16> {
        let inner = self.bracketed()?;
        let port = inner.strip_prefix("|||")?.strip_suffix('|')?;
        u16::from_str(port).ok()
    }
}

struct FtpMultiLineReplyParser {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl FtpMultiLineReplyParser {
    fn new(code: u16, first_line: &[u8]) -> Result<Self, FtpError> {
        Ok(FtpMultiLineReplyParser {
            code,
            end_prefix: [first_line[0], first_line[1], first_line[2], b' '],
            lines: vec![line_text(&first_line[4..])?],
        })
    }

    fn feed_line(&mut self, line: &[u8]) -> Result<bool, FtpError> {
        if line.starts_with(&self.end_prefix) {
            self.lines.push(line_text(&line[4..])?);
            Ok(true)
        } else {
            // keep leading whitespace, FEAT style listings rely on it
            self.lines.push(line_text(line)?);
            Ok(false)
        }
    }

    fn finish(self) -> FtpReply {
        FtpReply {
            code: self.code,
            lines: self.lines,
        }
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<(), FtpError> {
        buf.clear();

        let limit = self.config.max_line_len as u64;
        let len = (&mut self.stream)
            .take(limit)
            .read_until(b'\n', buf)
            .await
            .map_err(FtpError::ReadFailed)?;
        if len == 0 {
            return Err(FtpError::ConnectionClosed);
        }
        if buf.last() != Some(&b'\n') {
            return if len as u64 >= limit {
                Err(FtpError::LineTooLong)
            } else {
                Err(FtpError::ConnectionClosed)
            };
        }

        tracing::trace!("ftp << {}", String::from_utf8_lossy(buf).trim_end());
        Ok(())
    }

    pub(crate) async fn read_reply(&mut self) -> Result<FtpReply, FtpError> {
        let mut buf = Vec::<u8>::with_capacity(256);
        self.read_line(&mut buf).await?;

        let code = parse_code(&buf)?;
        match buf.get(3) {
            Some(b' ') => Ok(FtpReply {
                code,
                lines: vec![line_text(&buf[4..])?],
            }),
            Some(b'\r') | Some(b'\n') => Ok(FtpReply {
                code,
                lines: vec![String::new()],
            }),
            Some(b'-') => {
                let mut parser = FtpMultiLineReplyParser::new(code, &buf)?;
                for _ in 0..self.config.max_multi_lines {
                    self.read_line(&mut buf).await?;
                    if parser.feed_line(&buf)? {
                        return Ok(parser.finish());
                    }
                }
                Err(FtpError::TooManyLines)
            }
            _ => Err(FtpError::InvalidLineFormat),
        }
    }

    pub(crate) async fn timed_read_reply(
        &mut self,
        stage: &'static str,
    ) -> Result<FtpReply, FtpError> {
        match tokio::time::timeout(self.config.command_timeout, self.read_reply()).await {
            Ok(r) => r,
            Err(_) => Err(FtpError::ReplyTimedOut(stage)),
        }
    }
}
