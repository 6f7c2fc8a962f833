use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::form::context::FormContext;
use crate::form::events::{Effect, FormEvent};

/// Однопоточный исполнитель формы: принимает события из канала, применяет их
/// к контексту и запускает таймеры. Таймеры не отменяются.
pub struct FormDriver {
    ctx: FormContext,
    tx: UnboundedSender<FormEvent>,
    rx: UnboundedReceiver<FormEvent>,
    outstanding_timers: usize,
}

impl FormDriver {
    pub fn new(ctx: FormContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            tx,
            rx,
            outstanding_timers: 0,
        }
    }

    /// Отправитель для внешних событий (ввод пользователя)
    pub fn sender(&self) -> UnboundedSender<FormEvent> {
        self.tx.clone()
    }

    pub fn context(&self) -> &FormContext {
        &self.ctx
    }

    pub fn into_context(self) -> FormContext {
        self.ctx
    }

    pub fn outstanding_timers(&self) -> usize {
        self.outstanding_timers
    }

    /// Применяет событие сразу, минуя канал.
    pub fn handle(&mut self, event: FormEvent) -> Vec<Effect> {
        if matches!(
            event,
            FormEvent::ProcessingElapsed { .. } | FormEvent::SuccessNoticeElapsed { .. }
        ) {
            self.outstanding_timers = self.outstanding_timers.saturating_sub(1);
        }

        let effects = self.ctx.dispatch(event);
        for effect in &effects {
            if let Effect::Schedule { timer, delay } = effect {
                let tx = self.tx.clone();
                let event = timer.into_event();
                let delay = *delay;
                self.outstanding_timers += 1;
                log::debug!("scheduling {:?} in {:?}", timer, delay);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if tx.send(event).is_err() {
                        log::debug!("form driver dropped before timer fired");
                    }
                });
            }
        }
        effects
    }

    /// Ждёт следующее событие из канала и применяет его.
    pub async fn step(&mut self) -> Option<Vec<Effect>> {
        let event = self.rx.recv().await?;
        Some(self.handle(event))
    }

    /// Обрабатывает события, пока не отработают все запущенные таймеры.
    pub async fn settle(&mut self) {
        while self.outstanding_timers > 0 {
            if self.step().await.is_none() {
                break;
            }
        }
    }
}
