use tokio::sync::watch;

use crate::domain::ports::Navigator;
use crate::domain::routes::Route;

// Publishes the committed route so views can follow navigation.
pub struct WatchNavigator {
    current: watch::Sender<Route>,
}

impl WatchNavigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, route: Route) {
        let changed = self.current.send_if_modified(|current| {
            if *current == route {
                return false;
            }
            *current = route;
            true
        });
        if changed {
            tracing::info!(%route, "navigated.");
        }
    }
}
