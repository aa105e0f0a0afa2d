//! Minimal page for exercising the backend from a browser.

use std::sync::Arc;

use crate::framework::{operation_fn, DisplayAttributes, FieldData, FrameworkError, Path};
use crate::jwt::backend::{JwtAuthBackend, OPERATION_PREFIX_JWT};
use crate::logical::{Context, LogicalError, Operation, Request, Response};

const UI_CONTENT_TYPE: &str = "text/html";

pub fn path_ui(b: &Arc<JwtAuthBackend>) -> Result<Path, FrameworkError> {
    let b = Arc::clone(b);
    Path::builder("ui$")
        .display_attrs(DisplayAttributes::new(OPERATION_PREFIX_JWT, "ui"))
        .operation(
            Operation::Read,
            operation_fn(move |ctx, req, data| {
                let b = Arc::clone(&b);
                async move { b.path_ui_read(ctx, req, data).await }
            }),
        )
        .help(
            "Serve a local HTML page for manual testing.",
            "Reads the configured UI file on every request and returns it \
             verbatim as text/html. Fails with an I/O error if the file \
             cannot be read.",
        )
        .build()
}

impl JwtAuthBackend {
    async fn path_ui_read(
        &self,
        ctx: Context,
        req: Request,
        _data: FieldData,
    ) -> Result<Option<Response>, LogicalError> {
        let file = self.ui_file().to_path_buf();

        let bytes = ctx
            .run(tokio::fs::read(&file))
            .await?
            .map_err(|e| {
                tracing::error!(
                    request_id = %req.request_id,
                    file = %file.display(),
                    error = %e,
                    "Failed to read UI file"
                );
                LogicalError::io(&file, e)
            })?;

        let body = String::from_utf8(bytes).map_err(|e| {
            LogicalError::io(
                &file,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        Ok(Some(Response::raw_http(200, UI_CONTENT_TYPE, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::schema::UiConfig;
    use crate::framework::Backend;
    use crate::jwt::factory;
    use crate::logical::{HTTP_CONTENT_TYPE, HTTP_RAW_BODY, HTTP_STATUS_CODE};

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jwt-ui-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn backend_for(file: &std::path::Path) -> Backend {
        factory(&UiConfig {
            file_path: file.to_path_buf(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_serves_file_verbatim() {
        let file = scratch_file("test_ui.html");
        std::fs::write(&file, "<html>OK</html>").unwrap();

        let resp = backend_for(&file)
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resp.data[HTTP_STATUS_CODE], 200);
        assert_eq!(resp.data[HTTP_CONTENT_TYPE], "text/html");
        assert_eq!(resp.data[HTTP_RAW_BODY], "<html>OK</html>");
    }

    #[tokio::test]
    async fn test_rereads_on_every_call() {
        let file = scratch_file("test_ui.html");
        let backend = backend_for(&file);

        std::fs::write(&file, "first").unwrap();
        let first = backend
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap()
            .unwrap();
        std::fs::write(&file, "second").unwrap();
        let second = backend
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.data[HTTP_RAW_BODY], "first");
        assert_eq!(second.data[HTTP_RAW_BODY], "second");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let file = scratch_file("absent.html");
        let backend = backend_for(&file);

        let err = backend
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap_err();
        match err {
            LogicalError::Io { path, source } => {
                assert_eq!(path, file);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }

        // Backend still serves once the file shows up.
        std::fs::write(&file, "back").unwrap();
        let resp = backend
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.data[HTTP_RAW_BODY], "back");
    }

    #[tokio::test]
    async fn test_non_utf8_file_is_rejected() {
        let file = scratch_file("test_ui.html");
        std::fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let err = backend_for(&file)
            .handle_request(Request::new(Operation::Read, "ui"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, LogicalError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::InvalidData)
        );
    }

    #[tokio::test]
    async fn test_expired_context_skips_read() {
        let file = scratch_file("test_ui.html");
        std::fs::write(&file, "page").unwrap();
        let ctx = Context::background().with_timeout(Duration::ZERO);

        let err = backend_for(&file)
            .handle_request(Request::new(Operation::Read, "ui").with_context(ctx))
            .await
            .unwrap_err();
        assert!(matches!(err, LogicalError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_concurrent_reads() {
        let file = scratch_file("test_ui.html");
        std::fs::write(&file, "<html>shared</html>").unwrap();
        let backend = backend_for(&file);

        let reads = (0..8).map(|_| {
            let backend = backend.clone();
            tokio::spawn(async move {
                backend
                    .handle_request(Request::new(Operation::Read, "ui"))
                    .await
            })
        });

        for handle in reads.collect::<Vec<_>>() {
            let resp = handle.await.unwrap().unwrap().unwrap();
            assert_eq!(resp.data[HTTP_RAW_BODY], "<html>shared</html>");
        }
    }
}
