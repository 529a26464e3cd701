use std::sync::Arc;

use gateway_config::GatewayConfig;
use gateway_executor::FilteredSchema;

pub struct GatewaySharedState {
    pub schema: FilteredSchema,
    pub config: GatewayConfig,
}

impl GatewaySharedState {
    pub fn new(schema: FilteredSchema, config: GatewayConfig) -> Arc<Self> {
        Arc::new(Self { schema, config })
    }
}
