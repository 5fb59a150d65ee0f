pub mod figure;
pub mod network;
pub mod train;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc, Mutex};

    use shapes_nn::NetworkSpec;

    use crate::routes::MAX_SET_SIZE;
    use crate::state::{SharedState, StudioState, TrainingStatus};

    use super::{figure, test, train};

    fn idle_state() -> SharedState {
        let spec = NetworkSpec { seed: Some(11), ..NetworkSpec::default() };
        Arc::new(Mutex::new(StudioState::new(spec).unwrap()))
    }

    /// State as it looks while a background run holds the network.
    fn training_state() -> (SharedState, Arc<AtomicBool>) {
        let state = idle_state();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (_tx, rx) = mpsc::channel();
        {
            let mut st = state.lock().unwrap();
            st.network = None;
            st.training = TrainingStatus::Running {
                stop_flag:  stop_flag.clone(),
                epoch_rx:   Arc::new(Mutex::new(rx)),
                max_epochs: 5,
            };
        }
        (state, stop_flag)
    }

    #[test]
    fn requests_needing_the_network_conflict_while_training() {
        let (state, _) = training_state();

        assert_eq!(figure::handle_predict(state.clone()).status_code().0, 409);
        assert_eq!(figure::handle_train_one(state.clone()).status_code().0, 409);
        assert_eq!(test::run_test(test::TestRequest { size: 5 }, state.clone()).status_code().0, 409);

        let again = train::TrainRequest { size: 5, ..Default::default() };
        assert_eq!(train::start_training(again, state.clone()).status_code().0, 409);

        assert!(state.lock().unwrap().network.is_none());
    }

    #[test]
    fn stop_sets_the_running_flag() {
        let (state, stop_flag) = training_state();
        let response = train::handle_stop(state);
        assert_eq!(response.status_code().0, 200);
        assert!(stop_flag.load(Ordering::Relaxed));
    }

    #[test]
    fn idle_predict_answers_and_keeps_the_figure() {
        let state = idle_state();
        assert_eq!(figure::handle_predict(state.clone()).status_code().0, 200);

        let st = state.lock().unwrap();
        assert!(st.network.is_some());
        assert!(st.figure_png.is_some());
    }

    #[test]
    fn oversized_sets_are_refused() {
        let state = idle_state();
        let too_many = MAX_SET_SIZE + 1;

        assert_eq!(test::run_test(test::TestRequest { size: too_many }, state.clone()).status_code().0, 400);
        let train = train::TrainRequest { size: too_many, ..Default::default() };
        assert_eq!(train::start_training(train, state.clone()).status_code().0, 400);

        let st = state.lock().unwrap();
        assert!(st.network.is_some());
        assert!(!st.is_busy());
    }
}
