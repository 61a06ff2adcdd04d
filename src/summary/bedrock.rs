use anyhow::{Context, Result, anyhow};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use tokio::runtime::Runtime;

/// Sends one JSON request body to a hosted model and returns the raw JSON
/// response body.
pub trait ModelInvoker {
    fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// Bedrock runtime client driven on a current-thread runtime, so callers
/// stay synchronous.
pub struct BedrockInvoker {
    runtime: Runtime,
    client: Client,
}

impl BedrockInvoker {
    /// Credentials come from the standard AWS provider chain.
    pub fn new(region: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start runtime for Bedrock client")?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );

        Ok(Self {
            runtime,
            client: Client::new(&sdk_config),
        })
    }
}

impl ModelInvoker for BedrockInvoker {
    fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .invoke_model()
                    .model_id(model_id)
                    .content_type("application/json")
                    .accept("application/json")
                    .body(Blob::new(body))
                    .send(),
            )
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;

        Ok(output.body.into_inner())
    }
}
