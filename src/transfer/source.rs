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

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use tokio::io::AsyncRead;

use crate::error::{Error, Result};

/// A named byte stream to upload. The name becomes the remote file name.
pub struct FileSource {
    name: String,
    reader: Box<dyn AsyncRead + Send + Unpin>,
    len: Option<u64>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::invalid_argument(format!(
            "invalid remote file name '{name}'"
        )));
    }
    if name.contains(['/', '\\', '\r', '\n']) {
        return Err(Error::invalid_argument(format!(
            "remote file name '{}' must not contain path separators or line breaks",
            name.escape_debug()
        )));
    }
    Ok(())
}

impl FileSource {
    pub fn new(
        name: impl Into<String>,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            reader: Box::new(reader),
            len: None,
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        let mut source = Self::new(name, Cursor::new(bytes))?;
        source.len = Some(len);
        Ok(source)
    }

    /// Open a local file; the remote name is the last path component.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::invalid_argument(format!("{} has no file name", path.display()))
            })?;
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let mut source = Self::new(name, file)?;
        source.len = Some(len);
        Ok(source)
    }

    /// Upload under a different remote name.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local length when known up front.
    pub fn len(&self) -> Option<u64> {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == Some(0)
    }

    pub fn reader_mut(&mut self) -> &mut (dyn AsyncRead + Send + Unpin) {
        self.reader.as_mut()
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("name", &self.name)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_open_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("85_ORDERS_42_20250102_030405.DAT");
        std::fs::write(&path, b"a,b,c\n").unwrap();

        let mut source = FileSource::open(&path).await.unwrap();
        assert_eq!(source.name(), "85_ORDERS_42_20250102_030405.DAT");
        assert_eq!(source.len(), Some(6));

        let mut content = Vec::new();
        source.reader_mut().read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"a,b,c\n");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = FileSource::open("/this/file/does/not/exist.DAT")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_name_validation() {
        assert!(FileSource::from_bytes("ok.DAT", b"x".to_vec()).is_ok());
        for bad in ["", ".", "..", "a/b.DAT", "a\\b", "a\r\nDELE b"] {
            assert!(
                FileSource::from_bytes(bad, Vec::new())
                    .unwrap_err()
                    .is_invalid_argument(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_source() {
        let source = FileSource::from_bytes("empty.DAT", Vec::new()).unwrap();
        assert!(source.is_empty());
        let source = source.with_name("renamed.DAT").unwrap();
        assert_eq!(source.name(), "renamed.DAT");
    }
}
