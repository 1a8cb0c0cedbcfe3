use tracing::{debug, info, warn};

use crate::capabilities::{
    ApiError, CapabilityError, Capabilities, ProductApi, StorageError, StoredSetting,
};
use crate::event::Event;
use crate::form::{FormMode, ProductForm, Submission};
use crate::model::{Model, Product, ProductId, Screen, Toast};
use crate::query::{FetchOutcome, FetchPlan, FetchTicket, QueryDefaults};
use crate::view::ViewModel;
use crate::{AppError, THEME_STORAGE_KEY};

#[derive(Default)]
pub struct App;

impl App {
    fn api(model: &Model) -> Result<ProductApi, ApiError> {
        ProductApi::new(&model.config.api_base_url)
    }

    fn theme_setting() -> Result<StoredSetting<bool>, StorageError> {
        StoredSetting::new(THEME_STORAGE_KEY)
    }

    fn report(model: &mut Model, error: AppError) {
        warn!(code = error.code(), error = %error, "operation failed");
        model.active_error = Some(error);
    }

    fn save_in_flight(model: &Model) -> bool {
        model.form.as_ref().is_some_and(|form| form.saving)
    }

    fn show_list(model: &mut Model) {
        model.screen = Screen::ProductList;
        model.form = None;
    }

    /// Turns a fetch plan into the count and page requests of its cycle.
    fn dispatch_fetch(plan: Option<FetchPlan>, model: &mut Model, caps: &Capabilities) {
        let Some(plan) = plan else {
            return;
        };

        match Self::api(model) {
            Ok(api) => {
                api.send_count_request(&caps.http, plan.ticket, &plan.count_query);
                api.send_page_request(&caps.http, plan.ticket, &plan.page_query);
            }
            Err(e) => {
                Self::fetch_failed(model, plan.ticket, e);
            }
        }
    }

    fn fetch_failed(model: &mut Model, ticket: FetchTicket, error: ApiError) -> FetchOutcome {
        let error = AppError::from(error);
        let outcome = model
            .catalog
            .apply_fetch_failure(ticket, error.user_facing_message());
        if outcome == FetchOutcome::Failed {
            model.show_toast(
                Toast::error("Error fetching products").with_description(error.user_facing_message()),
            );
            Self::report(model, error);
        }
        outcome
    }

    fn start_delete(model: &Model, product: &Product, caps: &Capabilities) -> Result<(), CapabilityError> {
        Self::api(model)?.send_delete(&caps.http, product.id.clone())?;
        Ok(())
    }

    fn start_edit(model: &Model, id: &ProductId, caps: &Capabilities) -> Result<(), CapabilityError> {
        Self::api(model)?.send_get_product(&caps.http, id.clone())?;
        Ok(())
    }

    fn start_save(model: &Model, submission: &Submission, caps: &Capabilities) -> Result<(), CapabilityError> {
        let api = Self::api(model)?;
        match submission {
            Submission::Create(draft) => api.send_create(&caps.http, draft)?,
            Submission::Update(id, patch) => api.send_update(&caps.http, id, patch)?,
        }
        Ok(())
    }

    fn persist_theme(dark: bool, caps: &Capabilities) -> Result<(), CapabilityError> {
        Self::theme_setting()?.store(&caps.kv, &dark, |result| {
            Event::ThemePersisted(Box::new(result))
        })?;
        Ok(())
    }

    fn restore_theme(model: &mut Model, result: Result<Option<Vec<u8>>, StorageError>) {
        let stored = result.and_then(|bytes| Self::theme_setting()?.decode(bytes.as_deref()));
        match stored {
            Ok(flag) => model.theme.restore(flag),
            Err(e) => {
                warn!(error = %e, "stored theme preference unreadable, using light");
                model.theme.restore(None);
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "handling event"
        );

        match event {
            Event::Noop => {}

            Event::AppStarted => {
                match Self::theme_setting() {
                    Ok(setting) => {
                        setting.load(&caps.kv, |result| Event::ThemeLoaded(Box::new(result)));
                    }
                    Err(e) => Self::report(model, e.into()),
                }

                let plan = model.catalog.poll_fetch();
                Self::dispatch_fetch(plan, model, caps);
                caps.render.render();
            }

            Event::Configure(config) => {
                match config.validate() {
                    Ok(()) => {
                        info!(
                            base_url = %config.api_base_url,
                            page_size = config.default_page_size,
                            "configuration applied"
                        );
                        model.catalog.reconfigure(QueryDefaults {
                            page_size: config.default_page_size,
                            sort: None,
                        });
                        model.config = *config;

                        let plan = model.catalog.poll_fetch();
                        Self::dispatch_fetch(plan, model, caps);
                    }
                    Err(e) => Self::report(model, e.into()),
                }
                caps.render.render();
            }

            Event::TableChanged(change) => {
                let plan = model.catalog.on_table_interaction(*change);
                Self::dispatch_fetch(plan, model, caps);
                caps.render.render();
            }

            Event::RefreshRequested => {
                let plan = model.catalog.request_refetch();
                Self::dispatch_fetch(plan, model, caps);
                caps.render.render();
            }

            Event::CountLoaded { ticket, result } => {
                let outcome = match *result {
                    Ok(total) => model.catalog.record_count(ticket, Ok(total)),
                    Err(e) => Self::fetch_failed(model, ticket, e),
                };
                if outcome != FetchOutcome::Stale {
                    caps.render.render();
                }
            }

            Event::PageLoaded { ticket, result } => {
                let outcome = match *result {
                    Ok(items) => model.catalog.record_page(ticket, Ok(items)),
                    Err(e) => Self::fetch_failed(model, ticket, e),
                };
                if outcome != FetchOutcome::Stale {
                    caps.render.render();
                }
            }

            Event::DeleteRequested { id } => {
                if model.deleting {
                    debug!(id = %id, "delete already in flight, ignoring request");
                    return;
                }
                match model.find_product(&id).cloned() {
                    Some(product) => model.pending_delete = Some(product),
                    None => {
                        warn!(id = %id, "delete requested for a product not on this page");
                        model.show_toast(Toast::error("Product not found"));
                    }
                }
                caps.render.render();
            }

            Event::DeleteConfirmed => {
                if model.deleting {
                    return;
                }
                let Some(product) = model.pending_delete.clone() else {
                    return;
                };

                match Self::start_delete(model, &product, caps) {
                    Ok(()) => model.deleting = true,
                    Err(e) => {
                        model.pending_delete = None;
                        model.show_toast(Toast::error("Delete failed"));
                        Self::report(model, e.into());
                    }
                }
                caps.render.render();
            }

            Event::DeleteCancelled => {
                if !model.deleting {
                    model.pending_delete = None;
                }
                caps.render.render();
            }

            Event::DeleteResponse { id, result } => {
                model.deleting = false;
                let name = model
                    .pending_delete
                    .take()
                    .map_or_else(|| id.to_string(), |product| product.nome);

                match *result {
                    Ok(()) => {
                        info!(id = %id, "product deleted");
                        model.show_toast(
                            Toast::success("Product deleted")
                                .with_description(format!("\"{name}\" was removed.")),
                        );
                        let plan = model.catalog.request_refetch();
                        Self::dispatch_fetch(plan, model, caps);
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "delete failed");
                        model.show_toast(
                            Toast::error("Delete failed")
                                .with_description("The product could not be removed. Please try again."),
                        );
                    }
                }
                caps.render.render();
            }

            Event::NewProductRequested => {
                if Self::save_in_flight(model) {
                    return;
                }
                model.form = Some(ProductForm::create());
                model.screen = Screen::ProductForm;
                caps.render.render();
            }

            Event::EditProductRequested { id } => {
                if Self::save_in_flight(model) {
                    return;
                }
                match Self::start_edit(model, &id, caps) {
                    Ok(()) => {
                        model.form = Some(ProductForm::loading(id));
                        model.screen = Screen::ProductForm;
                    }
                    Err(e) => {
                        model.show_toast(Toast::error("Error loading product"));
                        Self::report(model, e.into());
                    }
                }
                caps.render.render();
            }

            Event::ProductLoaded { id, result } => {
                let awaiting = model
                    .form
                    .as_ref()
                    .is_some_and(|form| form.loading && form.mode == FormMode::Edit(id.clone()));
                if !awaiting {
                    debug!(id = %id, "discarding product response for a closed form");
                    return;
                }

                match *result {
                    Ok(product) => {
                        model.form = Some(ProductForm::edit(&product, &model.config.formatter()));
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "could not load product for editing");
                        model.show_toast(
                            Toast::error("Error loading product")
                                .with_description(AppError::from(e).user_facing_message()),
                        );
                        Self::show_list(model);
                    }
                }
                caps.render.render();
            }

            Event::NameChanged(value) => {
                if let Some(form) = model.form.as_mut() {
                    form.set_nome(value);
                }
                caps.render.render();
            }

            Event::DescriptionChanged(value) => {
                if let Some(form) = model.form.as_mut() {
                    form.set_desc(value);
                }
                caps.render.render();
            }

            Event::CategoryChanged(value) => {
                if let Some(form) = model.form.as_mut() {
                    form.set_categoria(value);
                }
                caps.render.render();
            }

            Event::PriceInput(raw) => {
                let formatter = model.config.formatter();
                if let Some(form) = model.form.as_mut() {
                    form.set_price_input(&raw, &formatter);
                }
                caps.render.render();
            }

            Event::FormSubmitted => {
                let Some(form) = model.form.as_mut() else {
                    return;
                };
                if form.saving || form.loading {
                    return;
                }

                let submission = match form.submission() {
                    Ok(submission) => submission,
                    Err(errors) => {
                        debug!(error = %AppError::from(errors), "form rejected");
                        caps.render.render();
                        return;
                    }
                };

                match Self::start_save(model, &submission, caps) {
                    Ok(()) => {
                        if let Some(form) = model.form.as_mut() {
                            form.saving = true;
                        }
                    }
                    Err(e) => {
                        model.show_toast(Toast::error("Error saving product"));
                        Self::report(model, e.into());
                    }
                }
                caps.render.render();
            }

            Event::SaveResponse { result } => {
                // The form that issued the save is the one still marked saving.
                let editing = model
                    .form
                    .as_ref()
                    .filter(|form| form.saving)
                    .map(ProductForm::is_editing);

                match *result {
                    Ok(()) => {
                        info!(?editing, "product saved");
                        let plan = model.catalog.request_refetch();
                        Self::dispatch_fetch(plan, model, caps);

                        if let Some(editing) = editing {
                            let message = if editing {
                                "Product updated successfully!"
                            } else {
                                "Product created successfully!"
                            };
                            model.show_toast(Toast::success(message));
                            Self::show_list(model);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "save failed");
                        let Some(form) = model.form.as_mut().filter(|form| form.saving) else {
                            return;
                        };
                        form.saving = false;
                        model.show_toast(
                            Toast::error("Error saving product")
                                .with_description("The product could not be saved. Please try again."),
                        );
                    }
                }
                caps.render.render();
            }

            Event::FormCancelled => {
                if Self::save_in_flight(model) {
                    debug!("save in flight, keeping the form open");
                    return;
                }
                Self::show_list(model);
                caps.render.render();
            }

            Event::ToggleTheme => {
                let dark = model.theme.toggle();
                if let Err(e) = Self::persist_theme(dark, caps) {
                    Self::report(model, e.into());
                }
                caps.render.render();
            }

            Event::ThemeLoaded(result) => {
                Self::restore_theme(model, *result);
                caps.render.render();
            }

            Event::ThemePersisted(result) => {
                if let Err(e) = *result {
                    Self::report(model, e.into());
                    caps.render.render();
                }
            }

            Event::DismissToast => {
                model.clear_toast();
                caps.render.render();
            }

            Event::DismissError => {
                model.active_error = None;
                model.catalog.clear_error();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
