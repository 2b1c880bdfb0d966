#![forbid(unsafe_code)]

use pockets_contracts::access::TopicId;
use pockets_contracts::audit::{AuditEventInput, AuditEventKind};
use pockets_contracts::quiz::{rounded_percent, TestGrade, TestResultRecord};
use pockets_contracts::MonotonicTimeNs;
use pockets_storage::kv::KvSurface;
use pockets_storage::profile::{ProfileStore, StorageError};
use pockets_storage::trail::AuditTrail;

pub mod reason_codes {
    use pockets_contracts::ReasonCodeId;

    pub const TEST_RESULT_RECORDED: ReasonCodeId = ReasonCodeId(0x5154_0001);
}

/// Grade a finished final test and persist the per-topic result.
///
/// Results are informational: they never feed the access evaluator, and
/// a retake simply overwrites the previous row.
pub fn record_test_outcome<K: KvSurface>(
    store: &mut ProfileStore<K>,
    now: MonotonicTimeNs,
    topic_id: &TopicId,
    correct: u32,
    total: u32,
) -> Result<TestGrade, StorageError> {
    let percentage = rounded_percent(correct, total)?;
    let record = TestResultRecord::v1(topic_id.clone(), percentage, now)?;
    store.record_test_result(&record)?;
    let user_id = store.load_session().map(|s| s.user_id);
    let input = AuditEventInput::v1(
        AuditEventKind::TestResultRecorded,
        reason_codes::TEST_RESULT_RECORDED,
        now,
        user_id,
        Some(topic_id.clone()),
        Some(format!("{}%", percentage.value())),
    )?;
    AuditTrail::emit(store, input)?;
    Ok(TestGrade::from_percent(percentage))
}
