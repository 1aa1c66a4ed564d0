use crate::{
    cpld::{CpldData, CpldVariant},
    dev::client::I2cClient,
};
use std::sync::Arc;
use utils::{handle::Handle, vec::LockedVec};

/// Probed CPLD devices, one record per bound client.
///
/// The lock inside guards the list only; register traffic never takes it.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    records: LockedVec<Arc<CpldData>>,
}

impl ClientRegistry {
    pub fn new() -> ClientRegistry {
        ClientRegistry::default()
    }

    /// Add a record for `client`.
    ///
    /// If the list cannot grow the device is left unmanaged and `None` is returned. A
    /// client that is already registered keeps its existing record.
    pub fn attach(&self, client: &Handle<I2cClient>, variant: CpldVariant) -> Option<Arc<CpldData>> {
        let record = Arc::new(CpldData::new(client, variant));
        match self
            .records
            .try_push_unless(record.clone(), |r| r.is_client(client))
        {
            Ok(true) => Some(record),
            Ok(false) => {
                dev_warn!(client, "already in client store");
                self.find(client)
            }
            Err((_, err)) => {
                dev_dbg!(
                    client,
                    "Can't allocate client store node ({:#x}): {}",
                    client.addr(),
                    err
                );
                None
            }
        }
    }

    /// Remove and return the record for `client`. Unknown clients are ignored.
    pub fn detach(&self, client: &Handle<I2cClient>) -> Option<Arc<CpldData>> {
        let removed = self.records.remove_first(|r| r.is_client(client));
        if removed.is_none() {
            dev_dbg!(client, "not in client store");
        }
        removed
    }

    pub fn find(&self, client: &Handle<I2cClient>) -> Option<Arc<CpldData>> {
        self.records.find(|r| r.is_client(client))
    }

    pub fn contains(&self, client: &Handle<I2cClient>) -> bool {
        self.records.any(|r| r.is_client(client))
    }

    pub fn records(&self) -> Vec<Arc<CpldData>> {
        self.records.snapshot()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
