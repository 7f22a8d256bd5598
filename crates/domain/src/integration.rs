//! Integration descriptors.
//!
//! An integration is described by a zero-sized marker type. The descriptor
//! names the remote endpoints, the cache key of its device list and its
//! action vocabulary, which lets one generic dispatcher and one generic
//! scheduler serve every platform.

use crate::action::{BriseAction, DeviceAction, SmartThingsAction};

/// Static description of a device platform integration.
pub trait IntegrationKind: Send + Sync + 'static {
    /// The integration's action vocabulary.
    type Action: DeviceAction;

    /// Human-readable name used in notifications and logs.
    const NAME: &'static str;

    /// Remote endpoint receiving control commands.
    const CONTROL_ENDPOINT: &'static str;

    /// Remote endpoint returning authoritative device status.
    const STATUS_ENDPOINT: &'static str;

    /// Cache key of the device list this integration feeds.
    const DEVICE_LIST_KEY: &'static str;
}

/// The BRISE HVAC gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Brise;

impl IntegrationKind for Brise {
    type Action = BriseAction;

    const NAME: &'static str = "BRISE";
    const CONTROL_ENDPOINT: &'static str = "brise-control";
    const STATUS_ENDPOINT: &'static str = "brise-sync-status";
    const DEVICE_LIST_KEY: &'static str = "brise-devices";
}

/// The SmartThings hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmartThings;

impl IntegrationKind for SmartThings {
    type Action = SmartThingsAction;

    const NAME: &'static str = "SmartThings";
    const CONTROL_ENDPOINT: &'static str = "smartthings-control";
    const STATUS_ENDPOINT: &'static str = "smartthings-sync-status";
    const DEVICE_LIST_KEY: &'static str = "smartthings-devices";
}
