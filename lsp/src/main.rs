//! StreamQL Language Server - Entry Point

mod handlers;
mod server;

use server::StreamqlLanguageServer;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(StreamqlLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
