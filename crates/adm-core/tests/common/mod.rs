pub mod file_server;

use std::time::Duration;

use adm_core::task::TaskView;
use adm_core::ArchiveService;

/// Poll until the task is terminal (or give up after ~10s).
pub async fn wait_terminal(svc: &ArchiveService, id: &str) -> TaskView {
    for _ in 0..1000 {
        let view = svc.get_task_view(id).unwrap();
        if view.status.is_terminal() {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {id} never reached a terminal state");
}

/// A URL on a local port nothing listens on.
pub fn refused_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/{}", port, path.trim_start_matches('/'))
}
