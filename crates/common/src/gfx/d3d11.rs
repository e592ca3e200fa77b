//! Direct3D 11 implementation of the device and context traits, plus the
//! swap chain and render targets a windowed demo needs.

use windows::core::{Interface, PCSTR};
use windows::Win32::Foundation::{HMODULE, HWND, TRUE};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use super::device::*;
use super::texture::TextureData;
use crate::color::Color;

fn create_error(kind: ResourceKind) -> impl FnOnce(windows::core::Error) -> DeviceError {
    move |e| DeviceError::Create {
        kind,
        message: e.message(),
    }
}

fn missing(kind: ResourceKind) -> DeviceError {
    DeviceError::Create {
        kind,
        message: "the device returned no object".to_string(),
    }
}

fn dxgi_format(format: VertexFormat) -> DXGI_FORMAT {
    match format {
        VertexFormat::Float32x2 => DXGI_FORMAT_R32G32_FLOAT,
        VertexFormat::Float32x4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

/// Shader resource view together with the texture it views.
#[derive(Clone)]
pub struct TextureView {
    #[allow(unused)]
    texture: ID3D11Texture2D,
    view: ID3D11ShaderResourceView,
}

#[derive(Clone)]
pub struct Device {
    device: ID3D11Device,
}

impl Device {
    pub fn get(&self) -> &ID3D11Device {
        &self.device
    }

    fn create_buffer(
        &self,
        kind: ResourceKind,
        desc: &D3D11_BUFFER_DESC,
        data: Option<&[u8]>,
        label: &str,
    ) -> Result<ID3D11Buffer, DeviceError> {
        let init = data.map(|data| D3D11_SUBRESOURCE_DATA {
            pSysMem: data.as_ptr() as *const _,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        });

        let mut buffer = None;
        unsafe {
            self.device.CreateBuffer(
                desc,
                init.as_ref().map(|init| init as *const _),
                Some(&mut buffer),
            )
        }
        .map_err(create_error(kind))?;

        log::debug!("Created {kind} of {} bytes ({label})", desc.ByteWidth);
        buffer.ok_or_else(|| missing(kind))
    }

    fn create_immutable_buffer(
        &self,
        kind: ResourceKind,
        bind_flags: D3D11_BIND_FLAG,
        data: &[u8],
        label: &str,
    ) -> Result<ID3D11Buffer, DeviceError> {
        if data.is_empty() {
            return Err(DeviceError::EmptyData(kind));
        }
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: data.len() as u32,
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: bind_flags.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        self.create_buffer(kind, &desc, Some(data), label)
    }
}

impl GraphicsDevice for Device {
    type Buffer = ID3D11Buffer;
    type VertexShader = ID3D11VertexShader;
    type PixelShader = ID3D11PixelShader;
    type InputLayout = ID3D11InputLayout;
    type Texture = TextureView;
    type Sampler = ID3D11SamplerState;

    fn create_vertex_buffer(&self, data: &[u8], label: &str) -> Result<ID3D11Buffer, DeviceError> {
        self.create_immutable_buffer(ResourceKind::VertexBuffer, D3D11_BIND_VERTEX_BUFFER, data, label)
    }

    fn create_index_buffer(&self, data: &[u8], label: &str) -> Result<ID3D11Buffer, DeviceError> {
        self.create_immutable_buffer(ResourceKind::IndexBuffer, D3D11_BIND_INDEX_BUFFER, data, label)
    }

    fn create_constant_buffer(&self, size: usize, label: &str) -> Result<ID3D11Buffer, DeviceError> {
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: size as u32,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        self.create_buffer(ResourceKind::ConstantBuffer, &desc, None, label)
    }

    fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<ID3D11VertexShader, DeviceError> {
        let mut shader = None;
        unsafe { self.device.CreateVertexShader(bytecode, None, Some(&mut shader)) }
            .map_err(create_error(ResourceKind::VertexShader))?;
        shader.ok_or_else(|| missing(ResourceKind::VertexShader))
    }

    fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<ID3D11PixelShader, DeviceError> {
        let mut shader = None;
        unsafe { self.device.CreatePixelShader(bytecode, None, Some(&mut shader)) }
            .map_err(create_error(ResourceKind::PixelShader))?;
        shader.ok_or_else(|| missing(ResourceKind::PixelShader))
    }

    fn create_input_layout(
        &self,
        elements: &[InputElement],
        vs_bytecode: &[u8],
    ) -> Result<ID3D11InputLayout, DeviceError> {
        let descs: Vec<D3D11_INPUT_ELEMENT_DESC> = elements
            .iter()
            .map(|element| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(element.semantic.as_ptr() as *const u8),
                SemanticIndex: 0,
                Format: dxgi_format(element.format),
                InputSlot: 0,
                AlignedByteOffset: element.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut layout = None;
        unsafe {
            self.device
                .CreateInputLayout(&descs, vs_bytecode, Some(&mut layout))
        }
        .map_err(create_error(ResourceKind::InputLayout))?;
        layout.ok_or_else(|| missing(ResourceKind::InputLayout))
    }

    fn create_texture(&self, data: &TextureData) -> Result<TextureView, DeviceError> {
        if data.pixels.is_empty() {
            return Err(DeviceError::EmptyData(ResourceKind::Texture));
        }

        let desc = D3D11_TEXTURE2D_DESC {
            Width: data.width,
            Height: data.height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let init = D3D11_SUBRESOURCE_DATA {
            pSysMem: data.pixels.as_ptr() as *const _,
            SysMemPitch: data.row_pitch(),
            SysMemSlicePitch: 0,
        };

        let mut texture = None;
        unsafe { self.device.CreateTexture2D(&desc, Some(&init), Some(&mut texture)) }
            .map_err(create_error(ResourceKind::Texture))?;
        let texture = texture.ok_or_else(|| missing(ResourceKind::Texture))?;

        let mut view = None;
        unsafe { self.device.CreateShaderResourceView(&texture, None, Some(&mut view)) }
            .map_err(create_error(ResourceKind::Texture))?;
        let view = view.ok_or_else(|| missing(ResourceKind::Texture))?;

        Ok(TextureView { texture, view })
    }

    fn create_sampler(&self) -> Result<ID3D11SamplerState, DeviceError> {
        let desc = D3D11_SAMPLER_DESC {
            Filter: D3D11_FILTER_MIN_MAG_MIP_LINEAR,
            AddressU: D3D11_TEXTURE_ADDRESS_WRAP,
            AddressV: D3D11_TEXTURE_ADDRESS_WRAP,
            AddressW: D3D11_TEXTURE_ADDRESS_WRAP,
            MipLODBias: 0.0,
            MaxAnisotropy: 1,
            ComparisonFunc: D3D11_COMPARISON_NEVER,
            BorderColor: [0.0; 4],
            MinLOD: 0.0,
            MaxLOD: f32::MAX,
        };

        let mut sampler = None;
        unsafe { self.device.CreateSamplerState(&desc, Some(&mut sampler)) }
            .map_err(create_error(ResourceKind::Sampler))?;
        sampler.ok_or_else(|| missing(ResourceKind::Sampler))
    }
}

/// The immediate context with the back buffer and depth buffer it draws into.
pub struct Context {
    context: ID3D11DeviceContext,
    render_target: ID3D11RenderTargetView,
    depth_stencil: ID3D11DepthStencilView,
    viewport: D3D11_VIEWPORT,
}

impl GraphicsContext for Context {
    type Device = Device;

    fn update_buffer(&mut self, buffer: &ID3D11Buffer, data: &[u8]) -> Result<(), DeviceError> {
        let mut desc = D3D11_BUFFER_DESC::default();
        unsafe { buffer.GetDesc(&mut desc) };
        if data.len() > desc.ByteWidth as usize {
            return Err(DeviceError::Oversize {
                size: data.len(),
                capacity: desc.ByteWidth as usize,
            });
        }

        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe {
            self.context
                .Map(buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(|e| DeviceError::Map(e.message()))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.pData as *mut u8, data.len());
            self.context.Unmap(buffer, 0);
        }
        Ok(())
    }

    fn set_pipeline(
        &mut self,
        vertex_shader: &ID3D11VertexShader,
        pixel_shader: &ID3D11PixelShader,
        input_layout: &ID3D11InputLayout,
    ) {
        unsafe {
            self.context.IASetInputLayout(input_layout);
            self.context.VSSetShader(vertex_shader, None);
            self.context.PSSetShader(pixel_shader, None);
        }
    }

    fn set_vs_constant_buffers(&mut self, start_slot: u32, buffers: &[&ID3D11Buffer]) {
        let buffers: Vec<Option<ID3D11Buffer>> = buffers.iter().map(|&b| Some(b.clone())).collect();
        unsafe { self.context.VSSetConstantBuffers(start_slot, Some(buffers.as_slice())) };
    }

    fn set_ps_constant_buffers(&mut self, start_slot: u32, buffers: &[&ID3D11Buffer]) {
        let buffers: Vec<Option<ID3D11Buffer>> = buffers.iter().map(|&b| Some(b.clone())).collect();
        unsafe { self.context.PSSetConstantBuffers(start_slot, Some(buffers.as_slice())) };
    }

    fn set_ps_texture(&mut self, slot: u32, texture: &TextureView, sampler: &ID3D11SamplerState) {
        unsafe {
            self.context
                .PSSetShaderResources(slot, Some(&[Some(texture.view.clone())]));
            self.context
                .PSSetSamplers(slot, Some(&[Some(sampler.clone())]));
        }
    }

    fn set_vertex_buffer(&mut self, buffer: &ID3D11Buffer, stride: u32) {
        let offset = 0;
        unsafe {
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(buffer.clone())),
                Some(&stride),
                Some(&offset),
            );
        }
    }

    fn set_index_buffer(&mut self, buffer: &ID3D11Buffer) {
        unsafe { self.context.IASetIndexBuffer(buffer, DXGI_FORMAT_R32_UINT, 0) };
    }

    fn draw_indexed(&mut self, index_count: u32) {
        unsafe {
            self.context
                .IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.context.DrawIndexed(index_count, 0, 0);
        }
    }

    /// Binds the back buffer, clears color and depth, and resets the viewport.
    fn clear(&mut self, color: Color) {
        unsafe {
            self.context.OMSetRenderTargets(
                Some(&[Some(self.render_target.clone())]),
                &self.depth_stencil,
            );
            self.context
                .ClearRenderTargetView(&self.render_target, &color.to_array());
            self.context.ClearDepthStencilView(
                &self.depth_stencil,
                (D3D11_CLEAR_DEPTH.0 | D3D11_CLEAR_STENCIL.0) as u32,
                1.0,
                0,
            );
            self.context.RSSetViewports(Some(&[self.viewport]));
        }
    }
}

/// Device, context and swap chain of one window.
pub struct Graphics {
    pub device: Device,
    pub context: Context,
    swap_chain: IDXGISwapChain,
    vsync_enabled: bool,
}

impl Graphics {
    pub fn new(hwnd: HWND, config: &crate::Config) -> windows::core::Result<Self> {
        let width = config.client_width();
        let height = config.client_height();

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: width,
                Height: height,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: 60,
                    Denominator: 1,
                },
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ScanlineOrdering: DXGI_MODE_SCANLINE_ORDER_UNSPECIFIED,
                Scaling: DXGI_MODE_SCALING_UNSPECIFIED,
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: 1,
            OutputWindow: hwnd,
            Windowed: TRUE,
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: 0,
        };

        let flags = if config.debug_layer_enabled() {
            D3D11_CREATE_DEVICE_DEBUG
        } else {
            D3D11_CREATE_DEVICE_FLAG(0)
        };

        let mut device = None;
        let mut context = None;
        let mut swap_chain = None;
        unsafe {
            D3D11CreateDeviceAndSwapChain(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                flags,
                Some(&[D3D_FEATURE_LEVEL_11_0]),
                D3D11_SDK_VERSION,
                Some(&swap_chain_desc),
                Some(&mut swap_chain),
                Some(&mut device),
                None,
                Some(&mut context),
            )
        }
        .inspect_err(|e| log::error!("Failed to create the Direct3D 11 device: {e}"))?;

        let (Some(device), Some(context), Some(swap_chain)) = (device, context, swap_chain) else {
            return Err(windows::core::Error::from(windows::Win32::Foundation::E_FAIL));
        };
        let device: ID3D11Device = device;

        if config.debug_layer_enabled() {
            match device.cast::<ID3D11Debug>() {
                Ok(_) => log::info!("Direct3D 11 debug layer enabled"),
                Err(e) => log::warn!("Debug layer requested but unavailable: {e}"),
            }
        }

        let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0)? };
        let mut render_target = None;
        unsafe { device.CreateRenderTargetView(&back_buffer, None, Some(&mut render_target))? };

        let depth_desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let mut depth_buffer = None;
        unsafe { device.CreateTexture2D(&depth_desc, None, Some(&mut depth_buffer))? };
        let depth_buffer = depth_buffer
            .ok_or_else(|| windows::core::Error::from(windows::Win32::Foundation::E_FAIL))?;

        let mut depth_stencil = None;
        unsafe { device.CreateDepthStencilView(&depth_buffer, None, Some(&mut depth_stencil))? };

        let (Some(render_target), Some(depth_stencil)) = (render_target, depth_stencil) else {
            return Err(windows::core::Error::from(windows::Win32::Foundation::E_FAIL));
        };

        log::info!("Created Direct3D 11 device with a {width}x{height} swap chain");

        Ok(Self {
            device: Device { device },
            context: Context {
                context,
                render_target,
                depth_stencil,
                viewport: D3D11_VIEWPORT {
                    TopLeftX: 0.0,
                    TopLeftY: 0.0,
                    Width: width as f32,
                    Height: height as f32,
                    MinDepth: 0.0,
                    MaxDepth: 1.0,
                },
            },
            swap_chain,
            vsync_enabled: config.vsync_enabled(),
        })
    }

    pub fn present(&self) -> windows::core::Result<()> {
        let sync_interval = if self.vsync_enabled { 1 } else { 0 };
        unsafe { self.swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }.ok()
    }
}
