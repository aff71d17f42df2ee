use crate::error::DeliveryError;

pub trait PushSender: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), DeliveryError>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        token: &'a str,
        lines: &'a [String],
        alarm_mode: bool,
    ) -> Self::Fut<'a>;
}
