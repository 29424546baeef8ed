pub mod storage_permissions_logging;

use crate::ComplianceRule;
use std::sync::Arc;

/// Every rule shipped with this crate, in registration order.
pub fn builtin_rules() -> Vec<Arc<dyn ComplianceRule>> {
    vec![Arc::new(storage_permissions_logging::StoragePermissionsLogging::new())]
}
