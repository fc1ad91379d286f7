//! The document assembler drives one export from resolved records to sealed output.
//!
//! Layout is decided by the pure cursor and grid functions before any image
//! is requested. The images of one item are then fetched concurrently and
//! drawn strictly in index order as results come back.
//!
//! Dropping the `assemble` future (client went away) drops every in-flight
//! fetch and the partially built page model; nothing reaches the client.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cursor::{break_page, place_block, LayoutState};
use crate::errors::ExportError;
use crate::fetch::{fetch_with_timeout, AssetFetcher};
use crate::geometry::PageGeometry;
use crate::grid::plan_grid;
use crate::model::{label_for, Item, Record};
use crate::text::TextBlock;
use crate::writer::PageSink;

const TITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Upper bound on concurrent fetches for one item
    pub fetch_concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: 4,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Assembling {
        record: usize,
        item: usize,
        image: usize,
    },
    Sealed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub records: usize,
    pub pages: usize,
    pub images_drawn: usize,
    pub images_failed: usize,
}

pub struct DocumentAssembler<'a, S: PageSink> {
    fetcher: &'a dyn AssetFetcher,
    sink: S,
    geometry: PageGeometry,
    options: ExportOptions,
    state: LayoutState,
    phase: Phase,
    summary: ExportSummary,
}

impl<'a, S: PageSink> DocumentAssembler<'a, S> {
    pub fn new(
        fetcher: &'a dyn AssetFetcher,
        sink: S,
        geometry: PageGeometry,
        options: ExportOptions,
    ) -> Self {
        Self {
            fetcher,
            sink,
            geometry,
            options,
            state: LayoutState::start(&geometry),
            phase: Phase::Idle,
            summary: ExportSummary::default(),
        }
    }

    /// Lay out and draw every record, then seal the sink.
    ///
    /// Each record starts on a fresh page. Image failures leave blank cells;
    /// only an empty input or a sink failure aborts.
    pub async fn assemble(
        mut self,
        records: &[Record],
    ) -> Result<(S::Output, ExportSummary), ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoRecords);
        }

        for (record_index, record) in records.iter().enumerate() {
            if record_index > 0 {
                self.state = break_page(self.state, &self.geometry);
            }
            self.enter(Phase::Assembling {
                record: record_index,
                item: 0,
                image: 0,
            });

            let header = self.header_block(record);
            self.place_text(&header)?;

            for (item_index, item) in record.items.iter().enumerate() {
                self.enter(Phase::Assembling {
                    record: record_index,
                    item: item_index,
                    image: 0,
                });
                let block = self.item_block(item);
                self.place_text(&block)?;
                self.place_images(record, record_index, item_index, item).await?;
            }
            self.summary.records += 1;
        }

        self.enter(Phase::Sealed);
        let mut summary = self.summary;
        summary.pages = self.sink.page_count();
        let output = self.sink.finish()?;

        info!(
            records = summary.records,
            pages = summary.pages,
            images_drawn = summary.images_drawn,
            images_failed = summary.images_failed,
            "document sealed"
        );
        Ok((output, summary))
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "assembler phase");
        self.phase = phase;
    }

    fn header_block(&self, record: &Record) -> TextBlock {
        let width = self.geometry.printable_width();
        let mut block = TextBlock::new().push(&format!("Order {}", record.id), TITLE_SIZE, true, width);
        if !record.customer_name.trim().is_empty() {
            block = block.push(&format!("Customer: {}", record.customer_name), BODY_SIZE, false, width);
        }
        if let Some(note) = record.note.as_deref().filter(|n| !n.trim().is_empty()) {
            block = block.push(&format!("Note: {note}"), BODY_SIZE, false, width);
        }
        block
    }

    fn item_block(&self, item: &Item) -> TextBlock {
        let width = self.geometry.printable_width();
        TextBlock::new()
            .push(&label_for(&item.kind), LABEL_SIZE, true, width)
            .push(&item.description, BODY_SIZE, false, width)
    }

    /// Start physical pages until the writer has caught up with `page`.
    fn ensure_page(&mut self, page: usize) -> Result<(), ExportError> {
        while self.sink.page_count() <= page {
            self.sink.start_page()?;
        }
        Ok(())
    }

    fn place_text(&mut self, block: &TextBlock) -> Result<(), ExportError> {
        if block.is_empty() {
            return Ok(());
        }
        let height = block.height();
        if height > self.geometry.printable_height() {
            warn!(
                height,
                printable = self.geometry.printable_height(),
                "text block taller than a page, clipping it to a page of its own"
            );
        }

        let (bbox, next) = place_block(self.state, height, &self.geometry);
        self.ensure_page(next.page)?;
        self.sink.draw_text(&bbox, block)?;
        self.state = next;
        Ok(())
    }

    async fn place_images(
        &mut self,
        record: &Record,
        record_index: usize,
        item_index: usize,
        item: &Item,
    ) -> Result<(), ExportError> {
        let plan = plan_grid(self.state, item.images.len(), &self.geometry);
        if plan.cells.is_empty() {
            return Ok(());
        }
        debug!(
            record = %record.id,
            item = item_index,
            images = plan.cells.len(),
            rows = plan.rows(),
            "grid planned"
        );

        let fetcher = self.fetcher;
        let timeout = self.options.fetch_timeout;
        let fetches: Vec<_> = item
            .images
            .iter()
            .map(|image| fetch_with_timeout(fetcher, image, timeout))
            .collect();
        // buffered() yields in submission order no matter which fetch finishes first
        let mut results = stream::iter(fetches).buffered(self.options.fetch_concurrency.max(1));

        for (cell, image) in plan.cells.iter().zip(&item.images) {
            let Some(outcome) = results.next().await else {
                break;
            };
            self.enter(Phase::Assembling {
                record: record_index,
                item: item_index,
                image: cell.index,
            });
            self.ensure_page(cell.page)?;

            match outcome {
                Ok(decoded) => {
                    self.sink.draw_image(&cell.bbox, &decoded)?;
                    self.summary.images_drawn += 1;
                }
                Err(e) => {
                    warn!(
                        record = %record.id,
                        item = item_index,
                        image = cell.index,
                        url = %image,
                        error = %e,
                        "image unavailable, leaving its cell blank"
                    );
                    self.summary.images_failed += 1;
                }
            }
        }

        self.state = plan.after;
        Ok(())
    }
}
