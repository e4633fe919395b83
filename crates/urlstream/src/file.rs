use tokio::fs::File;
use tokio::io::AsyncReadExt;
use urlstream_core::Url;

use crate::error::Error;

/// Local-file transport: the URL's percent-decoded path opened read-only.
pub(crate) struct FileTransport {
    file: Option<File>,
}

impl FileTransport {
    pub(crate) fn new() -> FileTransport {
        FileTransport { file: None }
    }

    pub(crate) async fn open(&mut self, url: &Url) -> Result<(), Error> {
        if self.file.is_some() {
            return Err(Error::AlreadyOpen);
        }
        self.file = Some(File::open(url.path()).await?);
        Ok(())
    }

    /// `Ok(0)` is end of file.
    pub(crate) async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let file = self.file.as_mut().ok_or(Error::NotOpen)?;
        Ok(file.read(buf).await?)
    }

    pub(crate) fn close(&mut self) {
        self.file = None;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.file.is_some()
    }
}
