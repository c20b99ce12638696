use std::io::{self, Read, Write};

use anyhow::Context;

use crate::ProgError;

pub(crate) fn respond(method: &str, include_headers: bool) -> Result<(), ProgError> {
    let mut body = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut body)
        .context("failed to read request body from stdin")?;

    let response = passgen::request::handle_request(&mut rand::rngs::OsRng, method, &body);

    {
        let mut stdout = io::stdout().lock();
        if include_headers {
            writeln!(stdout, "HTTP/1.1 {}", response.status)
                .and_then(|()| {
                    for (name, value) in &response.headers {
                        writeln!(stdout, "{name}: {value}")?;
                    }
                    writeln!(stdout)
                })
                .context("failed to write response headers")?;
        }
        writeln!(stdout, "{}", response.body)
            .and_then(|()| stdout.flush())
            .context("failed to write response body")?;
    }

    if response.status.is_success() {
        Ok(())
    } else {
        Err(ProgError::RequestRejected(response.status))
    }
}
