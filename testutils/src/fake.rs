use httpmock::prelude::*;
use httpmock::{
    Mock,
    Then,
    When,
};
use serde_json::json;

type Handler = Box<dyn Fn(When, Then)>;

// A stand-in for the Kubernetes apiserver.  Register handlers, call `build` once, and finish with
// `assert`, which checks that every handler was hit exactly once.  Requests that no handler
// matched are echoed to stdout so that a failing test shows what the client actually sent.
pub struct FakeApiserver {
    server: MockServer,
    handlers: Vec<Handler>,
    mock_ids: Vec<usize>,
}

fn echo_request(req: &HttpMockRequest) -> bool {
    // println so the output shows up under `cargo test` in every crate, not just where tracing is set up
    println!("    fake apiserver got: {} {}", req.method(), req.uri().path());
    true
}

impl FakeApiserver {
    pub fn start() -> FakeApiserver {
        FakeApiserver {
            server: MockServer::start(),
            handlers: vec![],
            mock_ids: vec![],
        }
    }

    pub fn client(&self) -> kube::Client {
        let url = http::Uri::try_from(self.server.url("/")).expect("mock server URL is valid");
        kube::Client::try_from(kube::Config::new(url)).expect("client for mock server")
    }

    pub fn handle<F: Fn(When, Then) + 'static>(&mut self, f: F) -> &mut Self {
        self.handlers.push(Box::new(move |when, then| f(when.matches(echo_request), then)));
        self
    }

    // Any method; kube's get_opt and the delete-wait loop both see this as "gone"
    pub fn handle_not_found(&mut self, path: String) -> &mut Self {
        self.handle(move |when, then| {
            when.path(&path);
            then.status(404).json_body(status_not_found());
        })
    }

    pub fn build(&mut self) {
        for handler in &self.handlers {
            self.mock_ids.push(self.server.mock(handler).id);
        }

        // catch-all goes last so the real handlers get first pick
        self.server.mock(|when, _| {
            when.matches(echo_request);
        });
    }

    pub fn assert(&self) {
        for (i, id) in self.mock_ids.iter().enumerate() {
            println!("checking fake apiserver handler #{i}");
            Mock::new(*id, &self.server).assert();
        }
    }
}

pub fn make_fake_apiserver() -> (FakeApiserver, kube::Client) {
    let fake = FakeApiserver::start();
    let client = fake.client();
    (fake, client)
}

pub fn status_ok() -> serde_json::Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Success",
        "code": 200
    })
}

pub fn status_not_found() -> serde_json::Value {
    status_failure(404)
}

pub fn status_failure(code: u16) -> serde_json::Value {
    let reason = match code {
        403 => "Forbidden",
        404 => "NotFound",
        409 => "Conflict",
        422 => "Invalid",
        _ => "InternalError",
    };
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("fake apiserver says {reason}"),
        "reason": reason,
        "code": code
    })
}
