use crate::client::ViewClient;
use crate::error::ViewError;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Guests,
    Vendors,
}

/// The event whose guest or vendor dialog is open. Passed explicitly to
/// guest registration, RSVP changes and booking refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventScope {
    pub event_id: u64,
    pub kind: ScopeKind,
}

impl EventScope {
    pub fn guests(event_id: u64) -> Self {
        Self {
            event_id,
            kind: ScopeKind::Guests,
        }
    }

    pub fn vendors(event_id: u64) -> Self {
        Self {
            event_id,
            kind: ScopeKind::Vendors,
        }
    }

    pub fn dialog_id(&self) -> &'static str {
        match self.kind {
            ScopeKind::Guests => "guestModal",
            ScopeKind::Vendors => "vendorModal",
        }
    }

    pub fn list_id(&self) -> &'static str {
        match self.kind {
            ScopeKind::Guests => "guests-list",
            ScopeKind::Vendors => "vendors-list",
        }
    }

    pub fn loading_id(&self) -> &'static str {
        match self.kind {
            ScopeKind::Guests => "guests-loading",
            ScopeKind::Vendors => "vendors-loading",
        }
    }

    fn load_error(&self) -> &'static str {
        match self.kind {
            ScopeKind::Guests => "Error loading guests. Please try again.",
            ScopeKind::Vendors => "Error loading vendors. Please try again.",
        }
    }
}

impl ViewClient {
    pub async fn open_guest_manager(&self, event_id: u64) -> EventScope {
        self.open_scope(EventScope::guests(event_id)).await
    }

    pub async fn open_event_vendors(&self, event_id: u64) -> EventScope {
        self.open_scope(EventScope::vendors(event_id)).await
    }

    async fn open_scope(&self, scope: EventScope) -> EventScope {
        if scope.kind == ScopeKind::Guests {
            self.page.hide("guest-form-error");
        }
        self.page.show(scope.loading_id());
        self.page.set_html(scope.list_id(), "");
        self.page.open_dialog(scope.dialog_id());

        if let Err(err) = self.reload_scope(&scope).await {
            tracing::error!("loading {:?} for event {}: {err}", scope.kind, scope.event_id);
            self.page.set_html(
                scope.list_id(),
                format!(r#"<div class="text-danger">{}</div>"#, scope.load_error()),
            );
        }
        self.page.hide(scope.loading_id());
        scope
    }

    /// Refetches and re-renders the list shown for `scope`.
    pub async fn reload_scope(&self, scope: &EventScope) -> Result<(), ViewError> {
        match scope.kind {
            ScopeKind::Guests => {
                let guests = self.api.event_guests(scope.event_id).await?;
                render::render_guests(&self.page, scope.list_id(), &guests, scope.event_id);
            }
            ScopeKind::Vendors => {
                let bookings = self.api.event_bookings(scope.event_id).await?;
                render::render_event_bookings(&self.page, scope.list_id(), &bookings);
            }
        }
        Ok(())
    }
}
