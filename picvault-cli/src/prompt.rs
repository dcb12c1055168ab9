//! Interactive metadata provider reading answers line by line.

use std::io::{BufRead, Write};

use picvault_core::{Access, MetadataProvider, Result, VaultError};

/// Asks a human for each image's tags and visibility.
///
/// Generic over its streams so tests can drive it with in-memory buffers.
pub struct PromptMetadata<R, W> {
    input: R,
    output: W,
    access: Option<Access>,
    credential: Option<String>,
}

impl<R: BufRead, W: Write> PromptMetadata<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            access: None,
            credential: None,
        }
    }

    /// Use a fixed visibility instead of asking.
    pub fn with_access(mut self, access: Option<Access>) -> Self {
        self.access = access;
        self
    }

    /// Gate every stored image behind the same secret.
    pub fn with_credential(mut self, secret: Option<String>) -> Self {
        self.credential = secret;
        self
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")
            .and_then(|()| self.output.flush())
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| VaultError::Metadata(e.to_string()))?;
        if read == 0 {
            return Err(VaultError::Metadata(
                "input closed before an answer was given".into(),
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> MetadataProvider for PromptMetadata<R, W> {
    fn keywords(&mut self, image_name: &str) -> Result<String> {
        self.ask(&format!(
            "Enter the relevant keywords for {image_name} (separate with ','): "
        ))
    }

    fn features(&mut self, image_name: &str) -> Result<String> {
        self.ask(&format!(
            "List any features of {image_name} (separate with ','): "
        ))
    }

    fn access(&mut self, image_name: &str) -> Result<Access> {
        if let Some(access) = self.access {
            return Ok(access);
        }
        loop {
            let answer = self.ask(&format!("Store {image_name} as a public image (y/n): "))?;
            match answer.trim().to_lowercase().as_str() {
                "y" => return Ok(Access::Public),
                "n" => return Ok(Access::Private),
                _ => writeln!(self.output, "Please answer y or n.")
                    .map_err(|e| VaultError::Metadata(e.to_string()))?,
            }
        }
    }

    fn credential(&mut self, _image_name: &str) -> Result<Option<String>> {
        Ok(self.credential.clone())
    }
}
