//! In-memory cache backing the pool's stats endpoints.
//!
//! Producers elsewhere in the pool replace whole collections as chain and
//! connection state changes; the HTTP handlers only ever read. Every getter
//! returns an owned snapshot that stays consistent for the duration of the
//! call regardless of concurrent updates.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;

/// A block mined by the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinedWork {
    #[serde(rename = "blockheight")]
    pub block_height: u32,
    #[serde(rename = "blockurl")]
    pub block_url: String,
    #[serde(rename = "minedby")]
    pub mined_by: String,
    pub miner: String,
    #[serde(rename = "accountid")]
    pub account_id: String,
    pub confirmed: bool,
}

/// An account's share of the next payout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quota {
    #[serde(rename = "accountid")]
    pub account_id: String,
    pub percent: f64,
}

/// A connected mining client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub miner: String,
    pub ip: String,
    #[serde(rename = "hashrate")]
    pub hash_rate: String,
}

/// A payment owed or made to an account. `paid_on_height` is zero while the
/// payment is still pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    #[serde(rename = "workheight")]
    pub work_height: u32,
    pub amount: u64,
    #[serde(rename = "paidonheight")]
    pub paid_on_height: u32,
}

/// Snapshot cache of pool statistics.
#[derive(Default)]
pub struct PoolCache {
    mined_work: RwLock<Vec<MinedWork>>,
    reward_quotas: RwLock<Vec<Quota>>,
    clients: RwLock<HashMap<String, Vec<Client>>>,
    pending_payments: RwLock<HashMap<String, Vec<Payment>>>,
    archived_payments: RwLock<HashMap<String, Vec<Payment>>>,
}

impl PoolCache {
    /// Blocks mined by the pool, most recent first.
    pub fn mined_work(&self) -> Vec<MinedWork> {
        self.mined_work.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_mined_work(&self, work: Vec<MinedWork>) {
        *self.mined_work.write().unwrap_or_else(|e| e.into_inner()) = work;
    }

    /// Pending reward quotas, largest share first.
    pub fn reward_quotas(&self) -> Vec<Quota> {
        self.reward_quotas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_reward_quotas(&self, quotas: Vec<Quota>) {
        *self.reward_quotas.write().unwrap_or_else(|e| e.into_inner()) = quotas;
    }

    /// Connected clients grouped by account.
    pub fn clients(&self) -> HashMap<String, Vec<Client>> {
        self.clients.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_clients(&self, clients: HashMap<String, Vec<Client>>) {
        *self.clients.write().unwrap_or_else(|e| e.into_inner()) = clients;
    }

    /// Unpaid payments grouped by account.
    pub fn pending_payments(&self) -> HashMap<String, Vec<Payment>> {
        self.pending_payments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_pending_payments(&self, payments: HashMap<String, Vec<Payment>>) {
        *self
            .pending_payments
            .write()
            .unwrap_or_else(|e| e.into_inner()) = payments;
    }

    /// Completed payments grouped by account.
    pub fn archived_payments(&self) -> HashMap<String, Vec<Payment>> {
        self.archived_payments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_archived_payments(&self, payments: HashMap<String, Vec<Payment>>) {
        *self
            .archived_payments
            .write()
            .unwrap_or_else(|e| e.into_inner()) = payments;
    }
}
