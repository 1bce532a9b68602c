use super::event::UserEvent;
use super::machine::Wizard;
use super::request::{execute, Request};
use super::state::WizardState;
use crate::errors::AppResult;
use crate::gateway::TenderGateway;
use std::collections::VecDeque;

/// Drives a [`Wizard`] against a gateway, one event at a time.
///
/// Follow-up requests (search, then CPV population, then CPV listing) are
/// executed in order, each awaited before the next is issued. The first
/// failure stops the chain and is returned; whatever was committed before it
/// stays in the state.
pub struct Session<G> {
    wizard: Wizard,
    gateway: G,
}

impl<G: TenderGateway> Session<G> {
    pub fn new(wizard: Wizard, gateway: G) -> Self {
        Self { wizard, gateway }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn dispatch(&mut self, event: UserEvent) -> AppResult<()> {
        self.dispatch_with(event, |_| {}).await
    }

    /// Like [`Session::dispatch`], calling `on_request` before each backend call
    /// so the caller can show a loading indicator.
    pub async fn dispatch_with<F>(&mut self, event: UserEvent, mut on_request: F) -> AppResult<()>
    where
        F: FnMut(&Request),
    {
        let mut queue: VecDeque<Request> = self.wizard.handle(event)?.into_iter().collect();

        while let Some(request) = queue.pop_front() {
            on_request(&request);
            let completion = execute(&self.gateway, request).await;
            queue.extend(self.wizard.complete(completion)?);
        }
        Ok(())
    }
}
