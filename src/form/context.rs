use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::FormConfig;
use crate::errors::FormError;
use crate::form::events::{Effect, FormEvent, Key, Timer};
use crate::form::fields::{FieldControl, FieldId, RatingSlot, Slider, VALIDATED_FIELDS};
use crate::form::phone_mask::PhoneInput;
use crate::form::validation::{self, FieldKind};
use crate::services::submission::{self, parse_rating, Submission, PHONE_KEY};

/// Какие элементы интерфейса присутствуют на странице.
/// Отсутствующий элемент отключает связанную с ним функцию.
#[derive(Debug, Clone)]
pub struct Controls {
    pub fields: Vec<FieldId>,
    pub phone: bool,
    pub sliders: Vec<RatingSlot>,
    pub slider_displays: Vec<RatingSlot>,
    pub submit_button: bool,
    pub loading: bool,
    pub error_banner: bool,
    pub success_notice: bool,
    pub summary: bool,
}

impl Controls {
    /// Полная разметка формы обратной связи
    pub fn complete() -> Self {
        Self {
            fields: VALIDATED_FIELDS.iter().map(|spec| spec.id).collect(),
            phone: true,
            sliders: RatingSlot::ALL.to_vec(),
            slider_displays: RatingSlot::ALL.to_vec(),
            submit_button: true,
            loading: true,
            error_banner: true,
            success_notice: true,
            summary: true,
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.phone {
            missing.push("phone");
        }
        if !self.submit_button {
            missing.push("submit button");
        }
        if !self.success_notice {
            missing.push("success notice");
        }
        if !self.summary {
            missing.push("submission summary");
        }
        missing
    }
}

/// Единственная видимая область статуса: показ одного состояния скрывает остальные
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum StatusNotice {
    #[default]
    Hidden,
    Loading,
    Error(String),
    Success,
}

#[derive(Debug, Clone)]
struct PendingSubmission {
    submission: Submission,
}

/// Контекст формы: состояние всех элементов и обработка событий.
#[derive(Debug)]
pub struct FormContext {
    config: FormConfig,
    controls: Controls,
    fields: BTreeMap<FieldId, FieldControl>,
    phone: Option<PhoneInput>,
    sliders: BTreeMap<RatingSlot, Slider>,
    submit_enabled: Option<bool>,
    status: StatusNotice,
    summary: Option<String>,
    pending: Option<PendingSubmission>,
    notice_owner: Option<Uuid>,
}

impl FormContext {
    pub fn new(config: FormConfig, controls: Controls) -> Self {
        for name in controls.missing() {
            log::error!("{}", FormError::MissingControl(name.to_string()));
        }

        let fields = controls
            .fields
            .iter()
            .map(|id| (*id, FieldControl::default()))
            .collect();
        let sliders = controls
            .sliders
            .iter()
            .map(|slot| {
                let has_display = controls.slider_displays.contains(slot);
                (*slot, Slider::new(config.default_rating_value(), has_display))
            })
            .collect();

        let mut ctx = Self {
            phone: controls.phone.then(PhoneInput::new),
            submit_enabled: controls.submit_button.then_some(false),
            summary: controls.summary.then(String::new),
            config,
            controls,
            fields,
            sliders,
            status: StatusNotice::Hidden,
            pending: None,
            notice_owner: None,
        };
        ctx.check_form_validity();
        ctx
    }

    /// Обрабатывает одно событие и возвращает эффекты для исполнителя.
    pub fn dispatch(&mut self, event: FormEvent) -> Vec<Effect> {
        log::debug!("dispatch: {:?}", event);
        match event {
            FormEvent::Input { field, value } => {
                if let Some(control) = self.fields.get_mut(&field) {
                    control.value = value;
                }
                self.validate_field(field, field.kind(), false);
                Vec::new()
            }
            FormEvent::Blur { field } => {
                self.validate_field(field, field.kind(), false);
                Vec::new()
            }
            FormEvent::PhoneInput { value, cursor } => self.phone_input(&value, cursor),
            FormEvent::PhoneKeyDown { key, cursor } => self.phone_key_down(&key, cursor),
            FormEvent::PhoneFocus => match self.phone.as_mut() {
                Some(phone) => vec![Effect::SetCursor { position: phone.focus() }],
                None => Vec::new(),
            },
            FormEvent::PhoneBlur => {
                if let Some(phone) = self.phone.as_mut() {
                    phone.blur();
                }
                self.check_form_validity();
                Vec::new()
            }
            FormEvent::SliderInput { slot, value } => {
                let in_range = parse_rating(&value)
                    .is_some_and(|n| (1..=i64::from(self.config.max_rating)).contains(&n));
                if !in_range {
                    log::warn!(
                        "rating {} = {:?} is outside 1..={}",
                        slot.key(),
                        value,
                        self.config.max_rating
                    );
                }
                if let Some(slider) = self.sliders.get_mut(&slot) {
                    slider.set(value);
                }
                Vec::new()
            }
            FormEvent::Submit => match self.submit() {
                Ok(effects) => effects,
                Err(err) => {
                    log::warn!("submit rejected: {} ({})", err, err.code());
                    Vec::new()
                }
            },
            FormEvent::ProcessingElapsed { submission } => {
                match self.complete_submission(submission) {
                    Ok(effects) => effects,
                    Err(err) => {
                        log::warn!("{}", err);
                        Vec::new()
                    }
                }
            }
            FormEvent::SuccessNoticeElapsed { submission } => {
                self.hide_success_notice(submission);
                Vec::new()
            }
        }
    }

    /// Проверка поля. В режиме `check_only` состояние не меняется.
    pub fn validate_field(&mut self, id: FieldId, kind: FieldKind, check_only: bool) -> bool {
        let Some(control) = self.fields.get_mut(&id) else {
            return true;
        };

        let result = validation::check(&control.value, kind);
        let is_valid = result.is_ok();

        if !check_only {
            if let Err(err) = &result {
                log::debug!("field {} invalid: {}", id.key(), err.code());
            }
            control.annotate(&result);
            self.check_form_validity();
        }

        is_valid
    }

    /// Пересчитывает доступность кнопки отправки
    pub fn check_form_validity(&mut self) -> bool {
        let fields_valid = VALIDATED_FIELDS
            .iter()
            .fold(true, |acc, spec| self.validate_field(spec.id, spec.kind, true) && acc);
        let phone_complete = self.phone.as_ref().is_some_and(PhoneInput::is_complete);
        let is_valid = fields_valid && phone_complete;

        if let Some(enabled) = self.submit_enabled.as_mut() {
            *enabled = is_valid;
        }

        is_valid
    }

    fn phone_input(&mut self, raw: &str, cursor: usize) -> Vec<Effect> {
        let Some(phone) = self.phone.as_mut() else {
            return Vec::new();
        };

        let effects = phone
            .apply_input(raw, cursor)
            .map(|position| vec![Effect::SetCursor { position }])
            .unwrap_or_default();
        self.check_form_validity();
        effects
    }

    fn phone_key_down(&mut self, key: &Key, cursor: Option<usize>) -> Vec<Effect> {
        let Some(phone) = self.phone.as_mut() else {
            return Vec::new();
        };

        let outcome = phone.key_down(key, cursor);
        let mut effects = Vec::new();
        if outcome.suppress {
            effects.push(Effect::SuppressKey);
        }
        if let Some(position) = outcome.cursor {
            effects.push(Effect::SetCursor { position });
        }
        effects
    }

    fn submit(&mut self) -> Result<Vec<Effect>, FormError> {
        if !self.controls.success_notice || self.summary.is_none() {
            return Err(FormError::MissingControl(
                "submission summary or success notice".to_string(),
            ));
        }

        if self.submit_enabled != Some(true) {
            self.show_status(StatusNotice::Error(FormError::SubmitBlocked.to_string()));
            return Err(FormError::SubmitBlocked);
        }

        if let Some(pending) = &self.pending {
            return Err(FormError::SubmissionInFlight(pending.submission.id));
        }

        if let Some(summary) = self.summary.as_mut() {
            summary.clear();
        }
        self.show_status(StatusNotice::Loading);

        let submission = Submission::new(self.snapshot());
        match serde_json::to_string(&submission) {
            Ok(json) => log::info!("submitted data: {}", json),
            Err(err) => log::warn!("failed to serialize submission {}: {}", submission.id, err),
        }

        let timer = Timer::Processing { submission: submission.id };
        self.pending = Some(PendingSubmission { submission });

        Ok(vec![Effect::Schedule {
            timer,
            delay: self.config.processing_delay(),
        }])
    }

    fn complete_submission(&mut self, id: Uuid) -> Result<Vec<Effect>, FormError> {
        let pending = match self.pending.take() {
            Some(pending) if pending.submission.id == id => pending,
            other => {
                self.pending = other;
                return Err(FormError::UnknownSubmission(id));
            }
        };

        let submission = pending.submission;
        let html = submission::render_summary(&submission, self.config.max_rating);
        log::info!(
            "submission {} processed, average rating {}",
            submission.id,
            submission.rating_average()
        );

        if let Some(summary) = self.summary.as_mut() {
            *summary = html;
        }
        self.show_status(StatusNotice::Success);
        self.notice_owner = Some(submission.id);

        self.reset();
        self.check_form_validity();

        Ok(vec![Effect::Schedule {
            timer: Timer::SuccessNotice { submission: submission.id },
            delay: self.config.success_notice_delay(),
        }])
    }

    fn hide_success_notice(&mut self, id: Uuid) {
        if self.notice_owner == Some(id) && self.status == StatusNotice::Success {
            self.status = StatusNotice::Hidden;
            self.notice_owner = None;
        }
    }

    fn show_status(&mut self, status: StatusNotice) {
        let shown = match &status {
            StatusNotice::Hidden => true,
            StatusNotice::Loading => self.controls.loading,
            StatusNotice::Error(_) => self.controls.error_banner,
            StatusNotice::Success => self.controls.success_notice,
        };
        self.status = if shown { status } else { StatusNotice::Hidden };
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        let mut data: BTreeMap<String, String> = self
            .fields
            .iter()
            .map(|(id, control)| (id.key().to_string(), control.value.clone()))
            .collect();
        if let Some(phone) = &self.phone {
            data.insert(PHONE_KEY.to_string(), phone.value().to_string());
        }
        for (slot, slider) in &self.sliders {
            data.insert(slot.key().to_string(), slider.value.clone());
        }
        data
    }

    /// Сброс всех полей, оформления, слайдеров и телефона к значениям по умолчанию
    fn reset(&mut self) {
        for control in self.fields.values_mut() {
            control.reset();
        }
        let default_rating = self.config.default_rating_value();
        for slider in self.sliders.values_mut() {
            slider.set(default_rating.clone());
        }
        if let Some(phone) = self.phone.as_mut() {
            phone.reset();
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldControl> {
        self.fields.get(&id)
    }

    pub fn phone(&self) -> Option<&PhoneInput> {
        self.phone.as_ref()
    }

    pub fn slider(&self, slot: RatingSlot) -> Option<&Slider> {
        self.sliders.get(&slot)
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled.unwrap_or(false)
    }

    pub fn status(&self) -> &StatusNotice {
        &self.status
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_submission_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> FormView {
        FormView {
            fields: self
                .fields
                .iter()
                .map(|(id, control)| (id.key().to_string(), control.clone()))
                .collect(),
            phone: self.phone.clone(),
            sliders: self
                .sliders
                .iter()
                .map(|(slot, slider)| (slot.key().to_string(), slider.clone()))
                .collect(),
            submit_enabled: self.is_submit_enabled(),
            status: self.status.clone(),
            summary: self.summary.clone(),
        }
    }
}

/// Сериализуемый снимок состояния формы
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub fields: BTreeMap<String, FieldControl>,
    pub phone: Option<PhoneInput>,
    pub sliders: BTreeMap<String, Slider>,
    pub submit_enabled: bool,
    pub status: StatusNotice,
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::Decoration;

    fn form() -> FormContext {
        FormContext::new(FormConfig::default(), Controls::complete())
    }

    fn input(ctx: &mut FormContext, field: FieldId, value: &str) {
        ctx.dispatch(FormEvent::Input { field, value: value.to_string() });
    }

    fn fill_valid(ctx: &mut FormContext) {
        input(ctx, FieldId::FirstName, "Jonas");
        input(ctx, FieldId::LastName, "Jonaitis");
        input(ctx, FieldId::Email, "jonas@example.lt");
        input(ctx, FieldId::Address, "Gedimino pr. 1");
        ctx.dispatch(FormEvent::PhoneFocus);
        ctx.dispatch(FormEvent::PhoneInput { value: "+370 61234567".to_string(), cursor: 13 });
    }

    fn scheduled(effects: &[Effect]) -> Timer {
        match effects {
            [Effect::Schedule { timer, .. }] => *timer,
            other => panic!("expected a single schedule effect, got {:?}", other),
        }
    }

    #[test]
    fn submit_starts_disabled_and_phone_seeded() {
        let ctx = form();
        assert!(!ctx.is_submit_enabled());
        assert_eq!(ctx.phone().map(PhoneInput::value), Some("+370 6"));
        assert_eq!(ctx.slider(RatingSlot::Design).and_then(|s| s.display.as_deref()), Some("5"));
    }

    #[test]
    fn input_annotates_field_with_message() {
        let mut ctx = form();
        input(&mut ctx, FieldId::FirstName, "John3");
        let control = ctx.field(FieldId::FirstName).unwrap();
        assert_eq!(control.decoration, Decoration::Invalid);
        assert_eq!(control.error, "Name/Last Name must contain only letters (A-Z, Lithuanian).");

        ctx.dispatch(FormEvent::Blur { field: FieldId::Email });
        assert_eq!(ctx.field(FieldId::Email).unwrap().error, "This field is required.");
    }

    #[test]
    fn check_only_leaves_decoration_untouched() {
        let mut ctx = form();
        assert!(!ctx.validate_field(FieldId::Address, FieldKind::Address, true));
        assert_eq!(ctx.field(FieldId::Address).unwrap().decoration, Decoration::Neutral);
    }

    #[test]
    fn missing_field_control_validates_as_true() {
        let mut controls = Controls::complete();
        controls.fields.retain(|id| *id != FieldId::Address);
        let mut ctx = FormContext::new(FormConfig::default(), controls);
        assert!(ctx.validate_field(FieldId::Address, FieldKind::Address, false));
    }

    #[test]
    fn aggregate_requires_every_field_and_complete_phone() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        assert!(ctx.is_submit_enabled());

        input(&mut ctx, FieldId::Email, "a@b");
        assert!(!ctx.is_submit_enabled());
        input(&mut ctx, FieldId::Email, "a@b.c");
        assert!(ctx.is_submit_enabled());

        ctx.dispatch(FormEvent::PhoneInput { value: "+370 6 123 456".to_string(), cursor: 14 });
        assert!(!ctx.is_submit_enabled());
    }

    #[test]
    fn phone_key_down_produces_suppress_effect() {
        let mut ctx = form();
        ctx.dispatch(FormEvent::PhoneFocus);
        let effects = ctx.dispatch(FormEvent::PhoneKeyDown { key: Key::ArrowLeft, cursor: Some(6) });
        assert_eq!(effects, vec![Effect::SuppressKey, Effect::SetCursor { position: 6 }]);
    }

    #[test]
    fn phone_blur_runs_aggregator() {
        let mut ctx = form();
        ctx.dispatch(FormEvent::PhoneInput { value: "+370 6 12".to_string(), cursor: 9 });
        ctx.dispatch(FormEvent::PhoneBlur);
        let phone = ctx.phone().unwrap();
        assert_eq!(phone.error, "Phone number is incomplete.");
        assert!(!ctx.is_submit_enabled());
    }

    #[test]
    fn slider_input_updates_display() {
        let mut ctx = form();
        ctx.dispatch(FormEvent::SliderInput { slot: RatingSlot::Clarity, value: "9".to_string() });
        let slider = ctx.slider(RatingSlot::Clarity).unwrap();
        assert_eq!(slider.value, "9");
        assert_eq!(slider.display.as_deref(), Some("9"));
    }

    #[test]
    fn invalid_submit_shows_error_without_processing() {
        let mut ctx = form();
        input(&mut ctx, FieldId::FirstName, "Jonas");
        let effects = ctx.dispatch(FormEvent::Submit);

        assert!(effects.is_empty());
        assert_eq!(
            ctx.status(),
            &StatusNotice::Error("Please correct the errors marked in the form.".to_string())
        );
        assert_eq!(ctx.summary(), Some(""));
        assert!(!ctx.is_submission_pending());
    }

    #[test]
    fn invalid_submit_keeps_previous_summary() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        let Timer::Processing { submission } = scheduled(&ctx.dispatch(FormEvent::Submit)) else {
            panic!("expected processing timer");
        };
        ctx.dispatch(FormEvent::ProcessingElapsed { submission });
        let rendered = ctx.summary().unwrap().to_string();
        assert!(rendered.contains("Jonas Jonaitis"));

        // после сброса форма невалидна
        input(&mut ctx, FieldId::FirstName, "Petras");
        let effects = ctx.dispatch(FormEvent::Submit);

        assert!(effects.is_empty());
        assert_eq!(ctx.summary(), Some(rendered.as_str()));
        assert!(matches!(ctx.status(), StatusNotice::Error(_)));
        assert!(!ctx.is_submission_pending());
    }

    #[test]
    fn summary_uses_configured_rating_scale() {
        let config = FormConfig { max_rating: 5, default_rating: 3, ..FormConfig::default() };
        let mut ctx = FormContext::new(config, Controls::complete());
        fill_valid(&mut ctx);
        let Timer::Processing { submission } = scheduled(&ctx.dispatch(FormEvent::Submit)) else {
            panic!("expected processing timer");
        };
        ctx.dispatch(FormEvent::ProcessingElapsed { submission });

        let summary = ctx.summary().unwrap();
        assert!(summary.contains("3 / 5 <br>"));
        assert!(summary.contains("Jonas Jonaitis: 3.0"));
    }

    #[test]
    fn successful_submission_renders_summary_and_resets() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        ctx.dispatch(FormEvent::SliderInput { slot: RatingSlot::Design, value: "7".to_string() });
        ctx.dispatch(FormEvent::SliderInput { slot: RatingSlot::Clarity, value: "abc".to_string() });
        ctx.dispatch(FormEvent::SliderInput { slot: RatingSlot::Impression, value: "9".to_string() });

        let effects = ctx.dispatch(FormEvent::Submit);
        assert_eq!(ctx.status(), &StatusNotice::Loading);
        let Timer::Processing { submission } = scheduled(&effects) else {
            panic!("expected processing timer");
        };

        let effects = ctx.dispatch(FormEvent::ProcessingElapsed { submission });
        assert_eq!(scheduled(&effects), Timer::SuccessNotice { submission });
        assert_eq!(ctx.status(), &StatusNotice::Success);
        assert!(ctx.summary().unwrap().contains("Jonas Jonaitis: 8.0"));

        for spec in VALIDATED_FIELDS {
            let control = ctx.field(spec.id).unwrap();
            assert!(control.value.is_empty());
            assert_eq!(control.decoration, Decoration::Neutral);
        }
        assert_eq!(ctx.phone().unwrap().value(), "+370 6");
        assert_eq!(ctx.phone().unwrap().decoration, Decoration::Neutral);
        assert_eq!(ctx.slider(RatingSlot::Design).unwrap().display.as_deref(), Some("5"));
        assert!(!ctx.is_submit_enabled());

        ctx.dispatch(FormEvent::SuccessNoticeElapsed { submission });
        assert_eq!(ctx.status(), &StatusNotice::Hidden);
    }

    #[test]
    fn second_submit_while_processing_is_blocked() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        let first = ctx.dispatch(FormEvent::Submit);
        assert_eq!(first.len(), 1);

        let second = ctx.dispatch(FormEvent::Submit);
        assert!(second.is_empty());
        assert_eq!(ctx.status(), &StatusNotice::Loading);
    }

    #[test]
    fn stale_timer_does_not_complete_pending_submission() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        ctx.dispatch(FormEvent::Submit);

        let effects = ctx.dispatch(FormEvent::ProcessingElapsed { submission: Uuid::new_v4() });
        assert!(effects.is_empty());
        assert!(ctx.is_submission_pending());
    }

    #[test]
    fn old_notice_timer_keeps_newer_notice_visible() {
        let mut ctx = form();
        fill_valid(&mut ctx);
        let Timer::Processing { submission: first } = scheduled(&ctx.dispatch(FormEvent::Submit)) else {
            panic!("expected processing timer");
        };
        ctx.dispatch(FormEvent::ProcessingElapsed { submission: first });

        fill_valid(&mut ctx);
        let Timer::Processing { submission: second } = scheduled(&ctx.dispatch(FormEvent::Submit)) else {
            panic!("expected processing timer");
        };
        ctx.dispatch(FormEvent::ProcessingElapsed { submission: second });

        ctx.dispatch(FormEvent::SuccessNoticeElapsed { submission: first });
        assert_eq!(ctx.status(), &StatusNotice::Success);
        ctx.dispatch(FormEvent::SuccessNoticeElapsed { submission: second });
        assert_eq!(ctx.status(), &StatusNotice::Hidden);
    }

    #[test]
    fn submission_without_summary_container_is_disabled() {
        let mut controls = Controls::complete();
        controls.summary = false;
        let mut ctx = FormContext::new(FormConfig::default(), controls);
        fill_valid(&mut ctx);

        assert!(ctx.dispatch(FormEvent::Submit).is_empty());
        assert_eq!(ctx.status(), &StatusNotice::Hidden);
        assert!(ctx.summary().is_none());
    }

    #[test]
    fn view_serializes_control_state() {
        let mut ctx = form();
        input(&mut ctx, FieldId::Email, "a@b");
        let view = ctx.view();
        assert_eq!(view.fields["email"].decoration, Decoration::Invalid);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["phone"]["value"], "+370 6");
        assert_eq!(json["status"]["state"], "hidden");
        assert_eq!(json["submit_enabled"], false);
    }
}
