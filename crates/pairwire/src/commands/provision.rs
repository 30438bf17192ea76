//! `pairwire provision`: resolve names, run the provisioner, print the summary.

use std::sync::Arc;

use pairwire_core::{
    InventoryGateway, ObjectRef, ProvisionRequest, Provisioner, ReferenceKind, RestGateway,
};
use tracing::debug;

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

async fn lookup(
    gateway: &dyn InventoryGateway,
    kind: ReferenceKind,
    name: &str,
) -> Result<ObjectRef, CliError> {
    gateway
        .find_reference(kind, name)
        .await?
        .ok_or_else(|| CliError::NotFound {
            resource_type: kind.to_string(),
            identifier: name.to_owned(),
        })
}

pub async fn handle(args: ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::build_configs(global)?;
    debug!(
        url = %resolved.inventory.url,
        pool = %resolved.allocation.pool,
        output = ?resolved.output,
        "inventory resolved"
    );

    let gateway = Arc::new(RestGateway::new(&resolved.inventory)?);

    let request = ProvisionRequest {
        location: lookup(gateway.as_ref(), ReferenceKind::Location, &args.location).await?,
        device_type: lookup(gateway.as_ref(), ReferenceKind::DeviceType, &args.device_type)
            .await?,
        role: lookup(gateway.as_ref(), ReferenceKind::Role, &args.role).await?,
        debug: args.debug,
    };

    let summary = Provisioner::new(gateway, resolved.allocation).run(&request).await?;

    let rendered = output::render_summary(resolved.output, &summary)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
