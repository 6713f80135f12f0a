//! Line-oriented message report
//!
//! One block per synchronized message:
//!
//! ```text
//! Reply   flags=00000000 length=07 type=aabbcc id=3023 subindex=00 data=dd00 trailer=a638 crc=38a6/ok payload=30 23 00 DD 00 A6 38 frame=0100010007aabbcc302300dd00a638
//! OBJ[3023][U16] "Flow temperature" value=22.1 unit=°C
//! ```
//!
//! Diagnostics never appear here; they go to the session's diagnostic sink.

use std::fmt::Write;

use crate::checksum::ChecksumCheck;
use crate::session::{Outcome, Record};
use crate::types::{Frame, Message};

/// Render the identifying line of a message.
///
/// `checksum` is `None` when verification is disabled.
pub fn render_message(message: &Message, frame: &Frame, checksum: Option<ChecksumCheck>) -> String {
    let mut line = format!(
        "{:<7} flags={:08b} length={:02} type={} id={} subindex={:02} data={} trailer={}",
        message.direction,
        message.flags,
        message.payload_length,
        hex::encode(message.type_code),
        message.datapoint_id,
        message.subindex,
        hex::encode(&message.data),
        hex::encode(message.trailer),
    );

    if let Some(check) = checksum {
        let verdict = if check.is_valid() { "ok" } else { "mismatch" };
        let _ = write!(line, " crc={:04x}/{}", check.computed, verdict);
    }

    let payload: Vec<String> = frame.payload().iter().map(|b| format!("{:02X}", b)).collect();
    let _ = write!(line, " payload={} frame={}", payload.join(" "), hex::encode(frame.as_bytes()));
    line
}

/// Render a full record: the message line, then the datapoint line when the
/// datapoint is in the dictionary.
pub fn render_record(record: &Record<'_>) -> String {
    let mut block = render_message(&record.message, &record.frame, record.checksum);

    let Some(descriptor) = record.descriptor else {
        return block;
    };

    let _ = write!(
        block,
        "\nOBJ[{}][{}] \"{}\"",
        record.message.datapoint_id, descriptor.value_type, descriptor.description
    );

    match &record.outcome {
        Outcome::Value(value) => {
            let _ = write!(block, " value={}", value);
            if let Some(unit) = &descriptor.unit {
                let _ = write!(block, " unit={}", unit);
            }
        }
        Outcome::Failed(_) => {
            let _ = write!(block, " raw={}", hex::encode(&record.message.data));
        }
        Outcome::Request | Outcome::Unknown => {}
    }
    block
}
