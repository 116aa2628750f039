use anyhow::Context;
use swi_client::{Client, QueryRequest};
use swi_domain::config::ClientConfig;

/// Bootstrap a session, reporting the failing stage on error.
pub fn login(config: &ClientConfig) -> anyhow::Result<Client> {
    let mut client = Client::new(config).context("building client")?;
    client
        .init()
        .with_context(|| format!("logging in as {} at {}", client.email(), client.base_url()))?;
    Ok(client)
}

/// Run one query and print the payload.
pub fn run(
    config: &ClientConfig,
    document: &str,
    operation_name: Option<String>,
    variables: &str,
) -> anyhow::Result<()> {
    let query = read_document(document)?;
    let variables: serde_json::Value =
        serde_json::from_str(variables).context("parsing --variables as JSON")?;
    anyhow::ensure!(variables.is_object(), "--variables must be a JSON object");

    let mut request = QueryRequest::new(query).variables(variables);
    if let Some(name) = operation_name {
        request = request.operation_name(name);
    }

    let client = login(config)?;
    let payload: serde_json::Value = client
        .execute(&request)
        .with_context(|| format!("executing {}", request.label()))?;

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// `@path` reads the document from a file; anything else is the document.
fn read_document(document: &str) -> anyhow::Result<String> {
    match document.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(document.to_owned()),
    }
}
