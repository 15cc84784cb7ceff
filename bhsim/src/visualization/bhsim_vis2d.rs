use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;

use bevy::log::LogPlugin;
use bevy::math::primitives::Circle;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use log::info;

use crate::simulation::params::Settings;
use crate::simulation::scenario::CENTRAL_MASS;
use crate::simulation::states::{Body, NVec2};
use crate::simulation::worker::SnapshotSink;

#[derive(Component)]
struct BodyIndex(pub usize);

/// Half the visible extent in screen units; the domain radius maps onto it
const VIEW_HALF_EXTENT: f32 = 400.0;
const BODY_RADIUS: f32 = 2.0;
const CENTRAL_BODY_RADIUS: f32 = 8.0;

/// Snapshots in flight between the simulation and the viewer
const CHANNEL_DEPTH: usize = 2;

/// Simulation side of the viewer: forwards positions over a bounded channel.
pub struct ChannelSink {
    tx: SyncSender<Vec<NVec2>>,
}

impl SnapshotSink for ChannelSink {
    fn snapshot(&mut self, _step: usize, bodies: &[Body]) {
        let positions = bodies.iter().map(|b| b.x).collect();
        // full: the viewer is behind and skips this frame
        // disconnected: the window was closed, the run carries on headless
        let _ = self.tx.try_send(positions);
    }
}

/// Viewer side: Bevy resource holding the receiving end and the view transform.
#[derive(Resource)]
pub struct SnapshotFeed {
    rx: Mutex<Receiver<Vec<NVec2>>>,
    initial: Vec<Body>,
    center: NVec2,
    scale: f32,
}

impl SnapshotFeed {
    fn to_screen(&self, p: NVec2) -> (f32, f32) {
        let d = p - self.center;
        (d.x as f32 * self.scale, d.y as f32 * self.scale)
    }
}

/// Connected sink/feed pair centered on the generated domain
pub fn snapshot_channel(settings: &Settings, initial: &[Body]) -> (ChannelSink, SnapshotFeed) {
    let (tx, rx) = mpsc::sync_channel(CHANNEL_DEPTH);
    let r = settings.domain_radius;

    let feed = SnapshotFeed {
        rx: Mutex::new(rx),
        initial: initial.to_vec(),
        center: NVec2::new(r, r),
        scale: VIEW_HALF_EXTENT / r as f32,
    };

    (ChannelSink { tx }, feed)
}

/// Open the window and block until it is closed.
pub fn run_2d(feed: SnapshotFeed) {
    info!("run_2d: starting Bevy 2D viewer with {} bodies", feed.initial.len());

    // env_logger already owns the `log` facade
    App::new()
        .insert_resource(feed)
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_bodies_system)
        .add_systems(Update, sync_transforms_system)
        .run();
}

fn setup_bodies_system(mut commands: Commands, feed: Res<SnapshotFeed>, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<ColorMaterial>>) {
    // 2D camera
    commands.spawn(Camera2dBundle::default());

    let small = Mesh2dHandle(meshes.add(Circle::new(BODY_RADIUS)));
    let large = Mesh2dHandle(meshes.add(Circle::new(CENTRAL_BODY_RADIUS)));
    let white = materials.add(ColorMaterial::from(Color::WHITE));

    for (i, body) in feed.initial.iter().enumerate() {
        let (x, y) = feed.to_screen(body.x);
        let mesh = if body.m >= CENTRAL_MASS { large.clone() } else { small.clone() };

        commands.spawn((
            MaterialMesh2dBundle {
                mesh,
                material: white.clone(),
                transform: Transform::from_xyz(x, y, 0.0),
                ..Default::default()
            },
            BodyIndex(i),
        ));
    }
}

fn sync_transforms_system(feed: Res<SnapshotFeed>, mut query: Query<(&BodyIndex, &mut Transform)>) {
    // only the newest snapshot matters
    let latest = match feed.rx.lock() {
        Ok(rx) => rx.try_iter().last(),
        Err(_) => None,
    };
    let Some(positions) = latest else {
        return;
    };

    for (BodyIndex(i), mut transform) in &mut query {
        if let Some(p) = positions.get(*i) {
            let (x, y) = feed.to_screen(*p);
            transform.translation.x = x;
            transform.translation.y = y;
        }
    }
}
