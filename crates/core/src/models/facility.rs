//! Beds, inventory and admission requests.

use super::{require_text, CollectionKind, Priority, Record};
use crate::state::MedicalState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// BEDS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BedKind {
    #[default]
    General,
    Icu,
    Pediatric,
    Maternity,
    Emergency,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BedStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
    Reserved,
    Cleaning,
}

/// A hospital bed.
///
/// `patient_id` is the occupancy back-reference. It is only meaningful while the bed is
/// occupied or reserved and is cleared when the bed is released.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: String,
    pub number: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default, rename = "type")]
    pub kind: BedKind,
    #[serde(default)]
    pub status: BedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

impl Bed {
    pub fn is_available(&self) -> bool {
        self.status == BedStatus::Available
    }

    pub fn is_occupied(&self) -> bool {
        self.status == BedStatus::Occupied
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BedDraft {
    pub number: String,
    pub room: String,
    pub ward: String,
    #[serde(rename = "type")]
    pub kind: BedKind,
    pub status: Option<BedStatus>,
    pub patient_id: Option<String>,
}

impl Record for Bed {
    type Draft = BedDraft;
    const KIND: CollectionKind = CollectionKind::Beds;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, _now: DateTime<Utc>, draft: BedDraft) -> Self {
        Self {
            id,
            number: draft.number,
            room: draft.room,
            ward: draft.ward,
            kind: draft.kind,
            status: draft.status.unwrap_or_default(),
            patient_id: draft.patient_id,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        require_text("number", &self.number)?;
        if self.patient_id.is_some()
            && !matches!(self.status, BedStatus::Occupied | BedStatus::Reserved)
        {
            return Err(format!(
                "bed {} cannot hold a patient while {:?}",
                self.number, self.status
            ));
        }
        Ok(())
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.beds
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.beds
    }
}

// ============================================================================
// INVENTORY
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn for_quantity(quantity: u32, min_stock: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min_stock: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Derived from `quantity` and `min_stock` on every write.
    #[serde(default)]
    pub status: StockStatus,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low(&self) -> bool {
        self.status != StockStatus::InStock
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub min_stock: u32,
    pub location: String,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl Record for InventoryItem {
    type Draft = InventoryItemDraft;
    const KIND: CollectionKind = CollectionKind::Inventory;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: InventoryItemDraft) -> Self {
        Self {
            id,
            status: StockStatus::for_quantity(draft.quantity, draft.min_stock),
            name: draft.name,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            min_stock: draft.min_stock,
            location: draft.location,
            supplier: draft.supplier,
            expiry_date: draft.expiry_date,
            updated_at: now,
        }
    }

    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }

    fn refresh(&mut self) {
        self.status = StockStatus::for_quantity(self.quantity, self.min_stock);
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.inventory
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.inventory
    }
}

// ============================================================================
// ADMISSION REQUESTS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Admitted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub id: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    pub patient_name: String,
    #[serde(default)]
    pub requested_by: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub priority: Priority,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub status: AdmissionStatus,
    #[serde(default)]
    pub bed_id: Option<String>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionRequestDraft {
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub requested_by: String,
    pub department: String,
    pub reason: String,
    pub priority: Option<Priority>,
}

impl Record for AdmissionRequest {
    type Draft = AdmissionRequestDraft;
    const KIND: CollectionKind = CollectionKind::AdmissionRequests;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: AdmissionRequestDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            patient_name: draft.patient_name,
            requested_by: draft.requested_by,
            department: draft.department,
            reason: draft.reason,
            priority: draft.priority.unwrap_or_default(),
            requested_at: now,
            status: AdmissionStatus::Pending,
            bed_id: None,
            decided_at: None,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientName", &self.patient_name)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.admission_requests
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.admission_requests
    }
}
