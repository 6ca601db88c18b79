//! Group processor: publishes an ordered instrument list to one board, one item at a time.

use tracing::info;

use crate::contract::{Board, CredentialPair, Instrument, InstrumentType};
use crate::pacing::{Pacer, Pause};
use crate::publish::ItemPublisher;
use crate::report::GroupResult;

pub struct GroupProcessor<'a> {
    publisher: ItemPublisher<'a>,
    pacer: &'a dyn Pacer,
}

impl<'a> GroupProcessor<'a> {
    pub fn new(publisher: ItemPublisher<'a>, pacer: &'a dyn Pacer) -> Self {
        Self { publisher, pacer }
    }

    /// Publish every instrument in input order.
    ///
    /// The item pause follows every item except the last, whatever the item's outcome.
    pub async fn process(
        &self,
        instruments: &[Instrument],
        kind: InstrumentType,
        label: &str,
        board: Option<Board>,
        credentials: &CredentialPair,
    ) -> GroupResult {
        info!(
            group = label,
            board = ?board,
            count = instruments.len(),
            "[GROUP] Starting group"
        );

        let mut items = Vec::with_capacity(instruments.len());
        for (i, instrument) in instruments.iter().enumerate() {
            info!(
                group = label,
                position = i + 1,
                total = instruments.len(),
                instrument = %instrument.code,
                name = %instrument.display_name(),
                "[GROUP] Processing item"
            );
            let result = self
                .publisher
                .publish(instrument, kind, credentials, board.as_ref())
                .await;
            items.push(result);

            if i + 1 < instruments.len() {
                self.pacer.pause(Pause::BetweenItems).await;
            }
        }

        let result = GroupResult::from_items(label, board, items);
        info!(
            group = label,
            total = result.total,
            success = result.success_count,
            failed = result.fail_count,
            skipped = result.skipped_count,
            "[GROUP] Group complete"
        );
        result
    }
}
