use super::*;
use crate::error::FetchErrorKind;
use crate::run::SilentProgress;
use crate::run::test_support::{RecordingObserver, Reply, ScriptedTransport, run_async_test};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn request(index: usize, timeout: Duration) -> OutboundRequest {
    RequestTemplate::new("http://example.test/".to_owned(), false, timeout).build(index)
}

#[test]
fn cache_bust_uses_query_separator() -> Result<(), String> {
    let with_query = cache_busted_url("http://x.test/?a=1", 42);
    if with_query != "http://x.test/?a=1&_=42" {
        return Err(format!("Unexpected url {}", with_query));
    }
    let without_query = cache_busted_url("http://x.test/", 42);
    if without_query != "http://x.test/?_=42" {
        return Err(format!("Unexpected url {}", without_query));
    }
    Ok(())
}

#[test]
fn template_without_cache_bust_keeps_url() -> Result<(), String> {
    let template = RequestTemplate::new(
        "http://x.test/path?a=1".to_owned(),
        false,
        Duration::from_secs(3),
    );
    let built = template.build(3);
    if built.url != "http://x.test/path?a=1" {
        return Err(format!("Unexpected url {}", built.url));
    }
    if built.index != 3 || built.timeout != Duration::from_secs(3) {
        return Err("Unexpected index or timeout".to_owned());
    }
    Ok(())
}

#[test]
fn template_rotates_known_user_agents() -> Result<(), String> {
    let template = RequestTemplate::new("http://x.test/".to_owned(), true, Duration::from_secs(1));
    for index in 1..=32 {
        let built = template.build(index);
        let agent = built
            .headers
            .iter()
            .find(|(key, _)| key == "User-Agent")
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| "Missing User-Agent".to_owned())?;
        if !USER_AGENTS.contains(&agent) {
            return Err(format!("Unknown User-Agent {}", agent));
        }
        let prefix = format!("http://x.test/?{}=", CACHE_BUST_PARAM);
        if !built.url.starts_with(&prefix) {
            return Err(format!("Missing cache-bust in {}", built.url));
        }
    }
    Ok(())
}

#[test]
fn execute_request_reports_success() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|_, _| Reply::ok(204, 0));
        let fetcher = transport.open_session(1).map_err(|err| err.to_string())?;
        let observer = RecordingObserver::default();

        let outcome = execute_request(
            fetcher.as_ref(),
            &request(2, Duration::from_secs(1)),
            &observer,
        )
        .await;

        if outcome.status() != Some(204) || outcome.is_failure() {
            return Err(format!("Unexpected outcome {:?}", outcome));
        }
        if outcome.index() != 2 || !outcome.error().is_empty() {
            return Err(format!("Unexpected outcome {:?}", outcome));
        }
        if observer.completion_order() != vec![2] {
            return Err("Observer was not notified".to_owned());
        }
        Ok(())
    })
}

#[test]
fn execute_request_keeps_error_statuses_as_successes() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|_, _| Reply::ok(429, 12));
        let fetcher = transport.open_session(1).map_err(|err| err.to_string())?;

        let outcome = execute_request(
            fetcher.as_ref(),
            &request(1, Duration::from_secs(1)),
            &SilentProgress,
        )
        .await;

        if outcome.status() != Some(429) || outcome.bytes() != 12 || outcome.is_failure() {
            return Err(format!("Unexpected outcome {:?}", outcome));
        }
        Ok(())
    })
}

#[test]
fn execute_request_reports_transport_failure() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|_, _| Reply::timeout());
        let fetcher = transport.open_session(1).map_err(|err| err.to_string())?;

        let outcome = execute_request(
            fetcher.as_ref(),
            &request(1, Duration::from_secs(1)),
            &SilentProgress,
        )
        .await;

        if outcome.status().is_some() || outcome.bytes() != 0 {
            return Err(format!("Unexpected outcome {:?}", outcome));
        }
        if !outcome.error().starts_with("timeout") {
            return Err(format!("Unexpected error {}", outcome.error()));
        }
        Ok(())
    })
}

#[test]
fn execute_request_enforces_timeout() -> Result<(), String> {
    run_async_test(async {
        let transport =
            ScriptedTransport::new(|_, _| Reply::ok(200, 1).after(Duration::from_secs(10)));
        let fetcher = transport.open_session(1).map_err(|err| err.to_string())?;

        let outcome = execute_request(
            fetcher.as_ref(),
            &request(1, Duration::from_millis(30)),
            &SilentProgress,
        )
        .await;

        if !outcome.is_failure() || outcome.error().is_empty() {
            return Err(format!("Expected timeout failure, got {:?}", outcome));
        }
        if outcome.elapsed() < Duration::from_millis(30) || outcome.elapsed() > Duration::from_secs(5)
        {
            return Err(format!("Unexpected elapsed {:?}", outcome.elapsed()));
        }
        Ok(())
    })
}

/// Serve one canned response per connection and hand back the raw request.
async fn spawn_one_shot_server(
    response: &'static [u8],
) -> Result<(String, tokio::task::JoinHandle<String>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("addr failed: {}", err))?;

    let handle = tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return String::new();
        };
        let mut buffer = vec![0u8; 4096];
        let read = stream.read(&mut buffer).await.unwrap_or(0);
        let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default()).into_owned();
        drop(stream.write_all(response).await);
        drop(stream.shutdown().await);
        request
    });

    Ok((format!("http://{}/", addr), handle))
}

#[test]
fn reqwest_transport_reads_status_and_body() -> Result<(), String> {
    run_async_test(async {
        let (url, server) = spawn_one_shot_server(
            b"HTTP/1.1 201 Created\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await?;

        let transport = ReqwestTransport::new(Duration::from_secs(5));
        let fetcher = transport.open_session(4).map_err(|err| err.to_string())?;
        let outbound = RequestTemplate::new(url, false, Duration::from_secs(5)).build(1);
        let response = fetcher
            .fetch(&outbound)
            .await
            .map_err(|err| err.to_string())?;

        if response.status != 201 || response.bytes != 5 {
            return Err(format!("Unexpected response {:?}", response));
        }

        let raw = server.await.map_err(|err| err.to_string())?;
        let lowered = raw.to_ascii_lowercase();
        if !lowered.starts_with("get / ") {
            return Err(format!("Expected a GET, got {}", raw));
        }
        if !USER_AGENTS.iter().any(|agent| raw.contains(agent)) {
            return Err(format!("Missing rotated User-Agent in {}", raw));
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_classifies_refused_connection() -> Result<(), String> {
    run_async_test(async {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("addr failed: {}", err))?;
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(5));
        let fetcher = transport.open_session(1).map_err(|err| err.to_string())?;
        let outbound =
            RequestTemplate::new(format!("http://{}/", addr), false, Duration::from_secs(5)).build(1);

        match fetcher.fetch(&outbound).await {
            Ok(response) => Err(format!("Expected failure, got {:?}", response)),
            Err(err) => {
                if err.kind != FetchErrorKind::Connect || err.message.is_empty() {
                    return Err(format!("Unexpected error {:?}", err));
                }
                Ok(())
            }
        }
    })
}
