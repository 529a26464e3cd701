#[cfg(test)]
mod http;
#[cfg(test)]
mod local_schema;
#[cfg(test)]
mod remote_schema;
#[cfg(test)]
mod subscriptions;
#[cfg(test)]
mod testkit;
