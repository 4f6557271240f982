//! Operator session: the pose being edited, the named pose store and the link.
//!
//! Every operator action goes through [`Session`]. Editing changes only the
//! in-memory pose; [`Session::update`] and routines are the only paths that
//! send, and [`Session::save`] / [`Session::delete`] persist the store before
//! returning.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use quadruped_link::config::{MAX_ANGLE, MIN_ANGLE};
use quadruped_link::robot::{Joint, Leg};
use quadruped_link::Pose;
use thiserror::Error;

use crate::routine::Routine;
use crate::store::{PoseStore, StoreError};
use crate::transport::{PoseSink, TransportError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Pose {0:?} not found")]
    PoseNotFound(String),

    #[error("Routine {0:?} not found")]
    RoutineNotFound(String),

    #[error("Channel {0} out of range (0-7)")]
    ChannelOutOfRange(usize),

    #[error("Pose name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct Session<S> {
    pose: Pose,
    store: PoseStore,
    store_path: PathBuf,
    routines: BTreeMap<String, Routine>,
    sink: S,
}

impl<S: PoseSink> Session<S> {
    /// Loads the pose store at `store_path` and starts from the resting pose.
    pub fn open(
        store_path: impl Into<PathBuf>,
        routines: BTreeMap<String, Routine>,
        sink: S,
    ) -> Result<Self, SessionError> {
        let store_path = store_path.into();
        let store = PoseStore::load_from(&store_path)?;
        info!(
            "{} stored poses, {} routines",
            store.len(),
            routines.len()
        );
        Ok(Self {
            pose: Pose::default(),
            store,
            store_path,
            routines,
            sink,
        })
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn store(&self) -> &PoseStore {
        &self.store
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn routine_names(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Sets one channel, clamped to the servo range. Returns the stored angle.
    pub fn set_channel(&mut self, channel: usize, angle: i32) -> Result<i32, SessionError> {
        let angle = clamp_angle(angle);
        if !self.pose.set(channel, angle) {
            return Err(SessionError::ChannelOutOfRange(channel));
        }
        Ok(angle)
    }

    /// Sets one joint, clamped to the servo range. Returns the stored angle.
    pub fn set_joint(&mut self, leg: Leg, joint: Joint, angle: i32) -> i32 {
        let angle = clamp_angle(angle);
        self.pose[(leg, joint)] = angle;
        angle
    }

    /// Stores the current pose as `name` and persists the store.
    ///
    /// On a failed write the in-memory store is rolled back, so it never
    /// holds a pose the file does not.
    pub fn save(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let previous = self.store.set(name, self.pose);
        if let Err(e) = self.store.save_to(&self.store_path) {
            match previous {
                Some(pose) => self.store.set(name, pose),
                None => self.store.delete(name),
            };
            return Err(e.into());
        }
        info!("Saved pose {name:?}: {}", self.pose);
        Ok(())
    }

    /// Replaces the current pose with the stored pose `name`. Nothing is sent.
    pub fn load(&mut self, name: &str) -> Result<Pose, SessionError> {
        let pose = *self
            .store
            .get(name.trim())
            .ok_or_else(|| SessionError::PoseNotFound(name.trim().to_string()))?;
        self.pose = pose;
        Ok(pose)
    }

    /// Removes `name` from the store and persists the store.
    pub fn delete(&mut self, name: &str) -> Result<Pose, SessionError> {
        let name = name.trim();
        let removed = self
            .store
            .delete(name)
            .ok_or_else(|| SessionError::PoseNotFound(name.to_string()))?;
        if let Err(e) = self.store.save_to(&self.store_path) {
            self.store.set(name, removed);
            return Err(e.into());
        }
        info!("Deleted pose {name:?}");
        Ok(removed)
    }

    /// Sends the current pose to the controller.
    pub fn update(&mut self) -> Result<(), SessionError> {
        self.sink.send(&self.pose)?;
        info!("Sent {}", self.pose);
        Ok(())
    }

    /// Plays routine `name`: each step loads its pose, sends it, then calls
    /// `wait` with the step's hold. Returns the number of poses sent.
    ///
    /// All poses are resolved before the first send, so a routine naming an
    /// unknown pose sends nothing.
    pub fn play<F>(&mut self, name: &str, mut wait: F) -> Result<usize, SessionError>
    where
        F: FnMut(Duration),
    {
        let routine = self
            .routines
            .get(name)
            .ok_or_else(|| SessionError::RoutineNotFound(name.to_string()))?;

        let steps = routine
            .steps
            .iter()
            .map(|step| {
                self.store
                    .get(&step.pose)
                    .map(|pose| (*pose, step.hold()))
                    .ok_or_else(|| SessionError::PoseNotFound(step.pose.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Playing {name} ({} steps)", steps.len());
        for (pose, hold) in &steps {
            self.pose = *pose;
            self.update()?;
            if !hold.is_zero() {
                wait(*hold);
            }
        }
        Ok(steps.len())
    }
}

fn clamp_angle(angle: i32) -> i32 {
    let clamped = angle.clamp(MIN_ANGLE, MAX_ANGLE);
    if clamped != angle {
        warn!("Angle {angle} clamped to {clamped}");
    }
    clamped
}
