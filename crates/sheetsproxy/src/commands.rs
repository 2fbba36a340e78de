use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use sheetsproxy_server::{ServiceConfig, SheetsProxyServer};
use sheetsproxy_sheets::{GoogleSheetsBackend, SheetsConfig};
use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};

use crate::args::ServerArgs;

impl ServerArgs {
    pub fn run(self) -> Result<()> {
        let Self {
            bind,
            access_key,
            access_key_header,
            credentials_path,
            request_timeout_secs,
            api_url,
            token_uri,
        } = self;

        let mut sheets = SheetsConfig::new(credentials_path);
        sheets.request_timeout = Duration::from_secs(request_timeout_secs);
        sheets.token_uri = token_uri;
        if let Some(api_url) = api_url {
            sheets.api_url = api_url;
        }

        let conf =
            ServiceConfig::new(access_key, sheets).with_access_key_header(access_key_header);
        let backend = Arc::new(GoogleSheetsBackend::try_new(conf.sheets.clone())?);

        let runtime = build_runtime("server")?;
        runtime.block_on(async move {
            let listener = TcpListener::bind(&bind).await?;
            let server = SheetsProxyServer::new(listener, conf, backend);
            server.serve().await?;
            Ok(())
        })
    }
}

fn build_runtime(thread_label: &'static str) -> Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .thread_name_fn(move || {
            static THREAD_ID: AtomicU64 = AtomicU64::new(0);
            let id = THREAD_ID.fetch_add(1, Ordering::Relaxed);
            format!("{thread_label}-thread-{id}")
        })
        .enable_all()
        .build()?;

    Ok(runtime)
}
